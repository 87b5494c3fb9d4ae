//! Filesystem scanner
//!
//! Lists one directory (no recursion) and keeps the regular files whose
//! extension is one of the configured image extensions, compared
//! case-insensitively. Results are absolute paths sorted by file name.

use anyhow::{Context, Result, bail};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Finds supported image files in a directory
#[derive(Debug, Clone)]
pub struct ImageScanner {
    matcher: GlobSet,
}

impl ImageScanner {
    /// Build a scanner accepting the given extensions (with or without a leading dot)
    pub fn new(extensions: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut added = 0;

        for extension in extensions {
            let extension = extension.trim().trim_start_matches('.');
            if extension.is_empty() {
                continue;
            }
            let glob = GlobBuilder::new(&format!("*.{extension}"))
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .with_context(|| format!("Invalid image extension '{extension}'"))?;
            builder.add(glob);
            added += 1;
        }

        if added == 0 {
            bail!("At least one image file extension must be configured");
        }

        Ok(Self {
            matcher: builder.build()?,
        })
    }

    /// Whether the file name carries a supported extension
    pub fn is_supported(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.matcher.is_match(Path::new(name)))
            .unwrap_or(false)
    }

    /// List supported image files directly inside `directory`.
    ///
    /// Fails before touching anything if the directory does not exist.
    pub fn scan(&self, directory: &Path) -> Result<Vec<PathBuf>> {
        if !directory.is_dir() {
            bail!("Input directory '{}' does not exist", directory.display());
        }

        let directory = directory
            .canonicalize()
            .with_context(|| format!("Failed to resolve directory: {}", directory.display()))?;

        let walker = WalkDir::new(&directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", directory.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            if self.is_supported(entry.path()) {
                files.push(entry.into_path());
            } else {
                debug!("Ignoring unsupported file {}", entry.path().display());
            }
        }

        debug!("Found {} image files in {}", files.len(), directory.display());
        Ok(files)
    }
}
