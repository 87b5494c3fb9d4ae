//! Librarian
//!
//! Copies every classified photo into `{output}/{directory_name}/{batch:03}/{basename}`.
//! Directories are created as needed and existing files are overwritten, so
//! running it twice yields the same tree. There is no rollback: a failure
//! part way through leaves the files copied so far in place.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::shade::BatchedImageRecord;

/// Files photos into per-batch folders
#[derive(Debug, Clone)]
pub struct Librarian {
    root: PathBuf,
}

impl Librarian {
    pub fn new(output_directory: &Path, directory_name: &str) -> Self {
        Self {
            root: output_directory.join(directory_name),
        }
    }

    /// Directory holding the batch folders
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn batch_directory(&self, batch: u32) -> PathBuf {
        self.root.join(format!("{batch:03}"))
    }

    /// Where a record's copy lands, keeping the source basename byte for byte
    pub fn destination_for(&self, record: &BatchedImageRecord) -> Result<PathBuf> {
        let filepath = &record.record.filepath;
        let Some(basename) = filepath.file_name() else {
            bail!("Cannot file {}: path has no file name", filepath.display());
        };
        Ok(self.batch_directory(record.batch).join(basename))
    }

    /// Copy every record's source file into its batch folder.
    ///
    /// Returns the number of files copied.
    pub fn file_all(&self, records: &[BatchedImageRecord]) -> Result<usize> {
        for record in records {
            let directory = self.batch_directory(record.batch);
            fs::create_dir_all(&directory).with_context(|| {
                format!("Failed to create directory: {}", directory.display())
            })?;

            let destination = self.destination_for(record)?;
            fs::copy(&record.record.filepath, &destination).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    record.record.filepath.display(),
                    destination.display()
                )
            })?;
            debug!("Copied {} to {}", record.record.filepath.display(), destination.display());
        }

        Ok(records.len())
    }
}
