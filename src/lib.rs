//! # shaderank - rank photos by shade
//!
//! Scans a directory of photos, scores each one by how dark it is, sorts the
//! scores into equal-width shade batches and writes a report. Optionally the
//! photos are copied into a photo book with one folder per batch.
//!
//! ## Quick Start
//!
//! ```bash
//! # Rank a folder and build ~/book/photo_book/001..010
//! shaderank --input_directory ~/photos --output_directory ~/book --parallel
//!
//! # Frame photos on a white square for Instagram
//! shaderank frame --source ~/photos --destination ~/framed
//! ```
//!
//! ## Pipeline
//!
//! [`scanner`] → [`shade`] (evaluated with a [`parallel`] strategy) →
//! [`reports`] and [`library`].

pub mod cli;
pub mod config;
pub mod frame;
pub mod library;
pub mod parallel;
pub mod reports;
pub mod scanner;
pub mod shade;

pub use cli::{Cli, Output};
pub use config::ShadeConfig;
pub use shade::{ImageRecord, ShadeRanker};

/// Result type alias for shaderank operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
