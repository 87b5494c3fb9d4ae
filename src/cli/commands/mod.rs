//! Command implementations for the shaderank CLI

pub mod config;
pub mod frame;
pub mod rank;

use super::Output;
use crate::parallel::{ExecutionStrategy, ProgressReporter};

/// Progress bar for a run, hidden when output is quiet
fn progress_for(output: &Output, total: usize, label: &str, strategy: ExecutionStrategy) -> ProgressReporter {
    if output.is_quiet() {
        ProgressReporter::hidden(total)
    } else {
        ProgressReporter::new(total, label, strategy)
    }
}
