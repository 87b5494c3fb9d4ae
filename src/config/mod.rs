//! Configuration management for shaderank
//!
//! Configuration is layered with figment: embedded defaults, then user and
//! project files, then `SHADERANK_*` environment variables, and finally the
//! command-line overrides. See [`ShadeConfig::load`].

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::parallel::{ExecutionStrategy, pool_size};

mod loader;

pub use loader::{DEFAULT_CONFIG, expand_tilde};

/// Main configuration structure for shaderank
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ShadeConfig {
    /// Evaluation and classification settings
    pub ranking: RankingConfig,

    /// Report writer settings
    pub report: ReportConfig,

    /// Librarian settings
    pub library: LibraryConfig,

    /// Instagram framer settings
    pub frame: FrameConfig,
}

/// What to do with an image that cannot be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Finish the batch, then fail the run with the first error
    #[default]
    Abort,
    /// Log the failure and leave the image out of the results
    Skip,
}

/// Where an image with a shade of exactly zero ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ZeroShadePolicy {
    /// Zero matches no `(k-1, k]` bucket and is left unclassified
    #[default]
    Drop,
    /// Zero is folded into batch 1
    FirstBatch,
}

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Comma-delimited `Batch,Filename,Shade,Square`
    #[default]
    Csv,
    /// Pretty-printed JSON document
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of shade buckets
    pub batches: u32,

    /// Evaluate images on a worker pool instead of the calling thread
    pub parallel: bool,

    /// Percentage of logical CPUs given to the worker pool (1-100)
    pub thread_percentage: u8,

    /// Hard cap on worker threads (0 = no cap)
    pub max_threads: usize,

    /// File extensions accepted by the scanner, matched case-insensitively
    pub extensions: Vec<String>,

    pub on_failure: FailurePolicy,

    pub zero_shade: ZeroShadePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Destination of the report, truncated on every run
    pub filename: PathBuf,

    pub format: ReportFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directory created under the output root to hold the batch folders
    pub directory_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    /// Side of the square white canvas in pixels
    pub canvas: u32,

    /// Margin kept free around the photo
    pub border: u32,

    /// Width of the black outline drawn around the photo
    pub outline: u32,

    /// JPEG quality of the framed output (1-100)
    pub quality: u8,

    /// Prefix added to the basename of every framed file
    pub prefix: String,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            batches: 10,
            parallel: false,
            thread_percentage: 80,
            max_threads: 0,
            extensions: vec!["jpg".to_string(), "jpeg".to_string()],
            on_failure: FailurePolicy::Abort,
            zero_shade: ZeroShadePolicy::Drop,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            filename: PathBuf::from("/tmp/bw_jpg_shade_ranking.csv"),
            format: ReportFormat::Csv,
        }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            directory_name: "photo_book".to_string(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            canvas: 1080,
            border: 20,
            outline: 1,
            quality: 100,
            prefix: "Final-".to_string(),
        }
    }
}

impl RankingConfig {
    /// Worker count for the parallel path, computed once from the host's cores
    pub fn pool_size(&self) -> usize {
        let workers = pool_size(num_cpus::get(), self.thread_percentage);
        if self.max_threads > 0 {
            std::cmp::min(self.max_threads, workers)
        } else {
            workers
        }
    }

    /// Execution strategy selected by the `parallel` switch
    pub fn strategy(&self) -> ExecutionStrategy {
        if self.parallel {
            ExecutionStrategy::Parallel {
                workers: self.pool_size(),
            }
        } else {
            ExecutionStrategy::Sequential
        }
    }
}

impl ShadeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ranking.batches == 0 {
            bail!("Number of batches must be at least 1");
        }
        if !(1..=100).contains(&self.ranking.thread_percentage) {
            bail!(
                "Thread percentage must be between 1 and 100, got {}",
                self.ranking.thread_percentage
            );
        }
        if self.ranking.extensions.iter().all(|ext| ext.trim().is_empty()) {
            bail!("At least one image file extension must be configured");
        }
        if self.library.directory_name.is_empty() {
            bail!("Library directory name cannot be empty");
        }
        if self.frame.canvas <= self.frame.border {
            bail!(
                "Frame canvas ({}) must be larger than the border ({})",
                self.frame.canvas,
                self.frame.border
            );
        }
        if !(1..=100).contains(&self.frame.quality) {
            bail!("Frame JPEG quality must be between 1 and 100, got {}", self.frame.quality);
        }

        Ok(())
    }
}
