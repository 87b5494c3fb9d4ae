//! Shade ranking
//!
//! [`ShadeRanker`] ties the pieces together: the [`ShadeEvaluator`] is run
//! over every file with the configured [`ExecutionStrategy`], failures are
//! handled according to the [`FailurePolicy`], and the surviving records
//! are handed to the [`BatchClassifier`].

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, RankingConfig, ZeroShadePolicy};
use crate::parallel::ExecutionStrategy;

pub mod classifier;
pub mod evaluator;
pub mod types;

pub use classifier::{BatchClassifier, Classification};
pub use evaluator::{EvaluationError, ShadeEvaluator};
pub use types::{BatchedImageRecord, BucketBoundary, ImageRecord};

/// Everything a ranking run produced
#[derive(Debug, Default)]
pub struct RankingOutcome {
    /// Classified records in ascending shade order
    pub batched: Vec<BatchedImageRecord>,
    /// Evaluated records that fell in no batch
    pub unclassified: Vec<ImageRecord>,
    /// Files skipped under [`FailurePolicy::Skip`]
    pub failures: Vec<EvaluationError>,
}

impl RankingOutcome {
    /// Number of images successfully evaluated
    pub fn evaluated(&self) -> usize {
        self.batched.len() + self.unclassified.len()
    }

    /// Population of every batch, index 0 holding batch 1
    pub fn batch_counts(&self, batches: u32) -> Vec<usize> {
        let mut counts = vec![0; batches as usize];
        for record in &self.batched {
            if let Some(count) = counts.get_mut(record.batch as usize - 1) {
                *count += 1;
            }
        }
        counts
    }
}

/// Evaluates and classifies a list of image files
#[derive(Debug, Clone)]
pub struct ShadeRanker {
    evaluator: ShadeEvaluator,
    classifier: BatchClassifier,
    strategy: ExecutionStrategy,
    on_failure: FailurePolicy,
}

impl ShadeRanker {
    pub fn new(
        batches: u32,
        strategy: ExecutionStrategy,
        on_failure: FailurePolicy,
        zero_shade: ZeroShadePolicy,
    ) -> Self {
        Self {
            evaluator: ShadeEvaluator::new(batches),
            classifier: BatchClassifier::new(batches, zero_shade),
            strategy,
            on_failure,
        }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(
            config.batches,
            config.strategy(),
            config.on_failure,
            config.zero_shade,
        )
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    /// Evaluate every file, returning one record per file that evaluated.
    ///
    /// The whole batch always runs to completion. Under
    /// [`FailurePolicy::Abort`] the first failure in input order is then
    /// returned as the error; under [`FailurePolicy::Skip`] failures are
    /// logged and returned alongside the records.
    pub fn evaluate_all<P>(
        &self,
        files: Vec<PathBuf>,
        progress: Option<P>,
    ) -> Result<(Vec<ImageRecord>, Vec<EvaluationError>)>
    where
        P: Fn(usize, usize, usize) + Send + Sync + 'static,
    {
        let evaluator = self.evaluator;
        let total = files.len();
        debug!("Evaluating {} files with {:?}", total, self.strategy);

        let results = self.strategy.execute(
            files,
            move |path: &PathBuf, _worker_id| evaluator.evaluate(path),
            progress,
        )?;

        let mut records = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(error) => match self.on_failure {
                    FailurePolicy::Abort => return Err(error.into()),
                    FailurePolicy::Skip => {
                        warn!("Skipping {}", error);
                        failures.push(error);
                    }
                },
            }
        }

        Ok((records, failures))
    }

    /// Evaluate then classify
    pub fn rank<P>(&self, files: Vec<PathBuf>, progress: Option<P>) -> Result<RankingOutcome>
    where
        P: Fn(usize, usize, usize) + Send + Sync + 'static,
    {
        let (records, failures) = self.evaluate_all(files, progress)?;
        let Classification {
            batched,
            unclassified,
        } = self.classifier.classify(records);

        info!(
            "Ranked {} images ({} unclassified, {} failed)",
            batched.len(),
            unclassified.len(),
            failures.len()
        );

        Ok(RankingOutcome {
            batched,
            unclassified,
            failures,
        })
    }
}
