use serde::Serialize;
use std::path::{Path, PathBuf};

/// Shade evaluation of one image file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    pub filepath: PathBuf,
    /// Normalized shade in `[0, batches]`, two decimals, lower is darker
    pub shade: f64,
    /// Width equals height
    pub is_square: bool,
}

impl ImageRecord {
    /// Basename of the source file
    pub fn filename(&self) -> String {
        file_name(&self.filepath)
    }
}

/// An [`ImageRecord`] assigned to a shade batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchedImageRecord {
    /// 1-based batch number
    pub batch: u32,
    #[serde(flatten)]
    pub record: ImageRecord,
}

impl BatchedImageRecord {
    pub fn filename(&self) -> String {
        self.record.filename()
    }
}

/// One `(lower, upper]` slice of the shade range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketBoundary {
    pub lower_exclusive: f64,
    pub upper_inclusive: f64,
}

impl BucketBoundary {
    /// The `batches` contiguous unit-width buckets covering `(0, batches]`.
    /// Bucket `k` (1-based) is `(k - 1, k]`.
    pub fn partition(batches: u32) -> Vec<BucketBoundary> {
        (1..=batches)
            .map(|k| BucketBoundary {
                lower_exclusive: f64::from(k - 1),
                upper_inclusive: f64::from(k),
            })
            .collect()
    }

    pub fn contains(&self, shade: f64) -> bool {
        self.lower_exclusive < shade && shade <= self.upper_inclusive
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_is_contiguous() {
        let buckets = BucketBoundary::partition(10);
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].lower_exclusive, 0.0);
        assert_eq!(buckets[9].upper_inclusive, 10.0);
        for pair in buckets.windows(2) {
            assert_eq!(pair[0].upper_inclusive, pair[1].lower_exclusive);
        }
    }

    #[test]
    fn test_bucket_edges() {
        let bucket = BucketBoundary::partition(3)[1];
        assert!(!bucket.contains(1.0));
        assert!(bucket.contains(1.01));
        assert!(bucket.contains(2.0));
        assert!(!bucket.contains(2.01));
    }

    #[test]
    fn test_filename_is_basename() {
        let record = ImageRecord {
            filepath: PathBuf::from("/photos/2024/beach.jpg"),
            shade: 4.5,
            is_square: false,
        };
        assert_eq!(record.filename(), "beach.jpg");
    }
}
