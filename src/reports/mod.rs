//! Report writers
//!
//! Serializes classified records, one row per record, in the order given
//! (ascending shade). Formats are pluggable through [`ReportGenerator`].

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use crate::config::ReportFormat;
use crate::shade::BatchedImageRecord;

mod csv;
mod json;

pub use self::csv::CsvReportGenerator;
pub use self::json::JsonReportGenerator;

/// Core reporting trait - allows pluggable report formats
pub trait ReportGenerator {
    /// Generate report content as a string
    fn generate(&self, records: &[BatchedImageRecord]) -> Result<String>;
}

/// Generator for a configured format
pub fn generator_for(format: ReportFormat) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Csv => Box::new(CsvReportGenerator),
        ReportFormat::Json => Box::new(JsonReportGenerator),
    }
}

/// Write the report to `path`, replacing any previous content
pub fn write_report(path: &Path, format: ReportFormat, records: &[BatchedImageRecord]) -> Result<()> {
    let content = generator_for(format).generate(records)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    debug!("Wrote {} report rows to {}", records.len(), path.display());
    Ok(())
}
