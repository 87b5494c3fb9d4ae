use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use super::ExecutionStrategy;

/// Progress bar driven by the executors' `(current, total, worker_id)` callback
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a visible bar for `total` items
    pub fn new(total: usize, label: &str, strategy: ExecutionStrategy) -> Self {
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>5}/{len:5} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        bar.set_message(match strategy {
            ExecutionStrategy::Sequential => label.to_string(),
            ExecutionStrategy::Parallel { workers } => format!("{label} ({workers} workers)"),
        });
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A bar that never draws, used in quiet mode and tests
    pub fn hidden(total: usize) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden());
        Self { bar }
    }

    /// Callback to hand to [`ExecutionStrategy::execute`].
    ///
    /// Workers report in any order, so the bar counts calls instead of
    /// trusting `current`.
    pub fn callback(&self) -> impl Fn(usize, usize, usize) + Send + Sync + 'static {
        let bar = self.bar.clone();
        move |_current: usize, _total: usize, _worker_id: usize| bar.inc(1)
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_tracks_position() {
        let reporter = ProgressReporter::hidden(4);
        let callback = reporter.callback();
        callback(1, 4, 0);
        callback(2, 4, 1);
        assert_eq!(reporter.position(), 2);
        reporter.finish();
    }

    #[test]
    fn test_reporter_with_parallel_execution() {
        let reporter = ProgressReporter::hidden(10);
        let strategy = ExecutionStrategy::Parallel { workers: 2 };
        strategy
            .execute((0..10).collect(), |x: &i32, _| *x, Some(reporter.callback()))
            .unwrap();
        assert_eq!(reporter.position(), 10);
    }
}
