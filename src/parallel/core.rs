use anyhow::Result;
use crossbeam::channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Worker count for a pool given the number of logical CPUs.
///
/// `available_cores * percentage / 100`, rounded down, never below 1.
pub fn pool_size(available_cores: usize, percentage: u8) -> usize {
    std::cmp::max(1, (available_cores * percentage as usize) / 100)
}

/// Fixed-size worker pool processing work items from a bounded queue
pub struct ParallelExecutor<T, R> {
    max_workers: usize,
    buffer_size: usize,
    _phantom: std::marker::PhantomData<fn(T) -> R>,
}

/// Context for worker threads to avoid too many function parameters
struct WorkerContext<T, R, F, P> {
    worker_id: usize,
    work_rx: Receiver<(usize, T)>,
    result_tx: Sender<(usize, R)>,
    progress_counter: Arc<AtomicUsize>,
    total_items: usize,
    processor: Arc<F>,
    progress_reporter: Option<Arc<P>>,
}

impl<T, R> ParallelExecutor<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            buffer_size: max_workers * 2,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Execute work items in parallel using a producer-consumer pattern.
    ///
    /// Blocks until every item has been processed. Results are returned in
    /// input order even though workers finish in any order.
    pub fn execute<F, P>(
        &self,
        work_items: Vec<T>,
        processor: F,
        progress_reporter: Option<P>,
    ) -> Result<Vec<R>>
    where
        F: Fn(&T, usize) -> R + Send + Sync + 'static,
        P: Fn(usize, usize, usize) + Send + Sync + 'static, // (current, total, worker_id)
    {
        if work_items.is_empty() {
            return Ok(Vec::new());
        }

        let actual_workers = std::cmp::min(self.max_workers, work_items.len());
        let (work_tx, work_rx): (Sender<(usize, T)>, Receiver<(usize, T)>) =
            bounded(self.buffer_size);
        let (result_tx, result_rx): (Sender<(usize, R)>, Receiver<(usize, R)>) =
            bounded(self.buffer_size);

        let progress_counter = Arc::new(AtomicUsize::new(0));
        let total_items = work_items.len();

        let processor = Arc::new(processor);
        let progress_reporter = progress_reporter.map(Arc::new);

        let indexed_results = crossbeam::thread::scope(|s| {
            for worker_id in 0..actual_workers {
                let ctx = WorkerContext {
                    worker_id,
                    work_rx: work_rx.clone(),
                    result_tx: result_tx.clone(),
                    progress_counter: progress_counter.clone(),
                    total_items,
                    processor: processor.clone(),
                    progress_reporter: progress_reporter.clone(),
                };

                s.spawn(move |_| Self::worker_thread(ctx));
            }

            // Producer thread: send work to workers
            let work_tx_clone = work_tx.clone();
            s.spawn(move |_| {
                for indexed_item in work_items.into_iter().enumerate() {
                    if work_tx_clone.send(indexed_item).is_err() {
                        break; // Workers dropped
                    }
                }
            });

            // Drop senders so receivers know when work is done
            drop(work_tx);
            drop(result_tx);

            Self::collect_results(result_rx, total_items)
        })
        .map_err(|_| anyhow::anyhow!("Thread panic occurred during parallel execution"))?;

        if indexed_results.len() != total_items {
            anyhow::bail!(
                "Parallel execution returned {} results for {} items",
                indexed_results.len(),
                total_items
            );
        }

        Ok(indexed_results.into_iter().map(|(_, result)| result).collect())
    }

    fn worker_thread<F, P>(ctx: WorkerContext<T, R, F, P>)
    where
        F: Fn(&T, usize) -> R,
        P: Fn(usize, usize, usize),
    {
        while let Ok((index, work_item)) = ctx.work_rx.recv() {
            let result = (ctx.processor)(&work_item, ctx.worker_id);

            if ctx.result_tx.send((index, result)).is_err() {
                break; // Receiver dropped
            }

            let current = ctx.progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref reporter) = ctx.progress_reporter {
                reporter(current, ctx.total_items, ctx.worker_id);
            }
        }
    }

    fn collect_results(result_rx: Receiver<(usize, R)>, total_items: usize) -> Vec<(usize, R)> {
        let mut results = Vec::with_capacity(total_items);

        while let Ok(result) = result_rx.recv() {
            results.push(result);

            if results.len() >= total_items {
                break;
            }
        }

        results.sort_by_key(|(index, _)| *index);
        results
    }
}

/// Sequential execution on the caller's thread
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn execute<T, R, F, P>(
        work_items: Vec<T>,
        processor: F,
        progress_reporter: Option<P>,
    ) -> Vec<R>
    where
        F: Fn(&T, usize) -> R,
        P: Fn(usize, usize, usize),
    {
        let total_items = work_items.len();
        let mut results = Vec::with_capacity(total_items);

        for (index, work_item) in work_items.iter().enumerate() {
            results.push(processor(work_item, 0)); // Sequential uses worker_id 0

            if let Some(reporter) = &progress_reporter {
                reporter(index + 1, total_items, 0);
            }
        }

        results
    }
}

/// Execution strategy enum for choosing between parallel and sequential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    pub fn execute<T, R, F, P>(
        &self,
        work_items: Vec<T>,
        processor: F,
        progress_reporter: Option<P>,
    ) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(&T, usize) -> R + Send + Sync + 'static,
        P: Fn(usize, usize, usize) + Send + Sync + 'static,
    {
        match self {
            ExecutionStrategy::Sequential => Ok(SequentialExecutor::execute(
                work_items,
                processor,
                progress_reporter,
            )),
            ExecutionStrategy::Parallel { workers } => {
                let executor = ParallelExecutor::new(*workers);
                executor.execute(work_items, processor, progress_reporter)
            }
        }
    }

    /// Number of threads doing the work
    pub fn workers(&self) -> usize {
        match self {
            ExecutionStrategy::Sequential => 1,
            ExecutionStrategy::Parallel { workers } => *workers,
        }
    }
}
