use tracing::warn;

use super::types::{BatchedImageRecord, BucketBoundary, ImageRecord};
use crate::config::ZeroShadePolicy;

/// Result of classifying a set of evaluated images
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Classification {
    /// Records in ascending shade order, each with its batch
    pub batched: Vec<BatchedImageRecord>,
    /// Records no bucket accepted (shade exactly zero under [`ZeroShadePolicy::Drop`])
    pub unclassified: Vec<ImageRecord>,
}

/// Splits records into equal-width shade buckets
#[derive(Debug, Clone)]
pub struct BatchClassifier {
    boundaries: Vec<BucketBoundary>,
    zero_shade: ZeroShadePolicy,
}

impl BatchClassifier {
    pub fn new(batches: u32, zero_shade: ZeroShadePolicy) -> Self {
        Self {
            boundaries: BucketBoundary::partition(batches),
            zero_shade,
        }
    }

    /// First bucket (1-based) whose `(lower, upper]` range holds `shade`
    pub fn batch_for(&self, shade: f64) -> Option<u32> {
        let found = self
            .boundaries
            .iter()
            .position(|bucket| bucket.contains(shade))
            .map(|index| index as u32 + 1);

        match (found, self.zero_shade) {
            (None, ZeroShadePolicy::FirstBatch) if shade == 0.0 && !self.boundaries.is_empty() => {
                Some(1)
            }
            (found, _) => found,
        }
    }

    /// Sort by shade and assign every record to its batch.
    ///
    /// The sort is stable, so records with equal shades keep their input order.
    pub fn classify(&self, mut records: Vec<ImageRecord>) -> Classification {
        records.sort_by(|a, b| a.shade.total_cmp(&b.shade));

        let mut classification = Classification::default();
        for record in records {
            match self.batch_for(record.shade) {
                Some(batch) => classification
                    .batched
                    .push(BatchedImageRecord { batch, record }),
                None => {
                    warn!(
                        "{} has shade {:.2} which falls in no batch, leaving it unclassified",
                        record.filepath.display(),
                        record.shade
                    );
                    classification.unclassified.push(record);
                }
            }
        }

        classification
    }
}
