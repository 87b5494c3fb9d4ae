//! Generic parallel execution framework
//!
//! Provides the two evaluation drivers used by ranking and framing:
//!
//! - [`ExecutionStrategy::Sequential`] runs every item on the caller's thread.
//! - [`ExecutionStrategy::Parallel`] fans items out to a fixed-size pool of
//!   worker threads fed by a bounded crossbeam channel, then joins on all of
//!   them before returning (bulk-synchronous, no streaming).
//!
//! Both strategies return exactly one result per input item, in input order.
//! The module knows nothing about images; the worker count is computed once
//! by the caller with [`pool_size`] and passed in.
//!
//! ```rust
//! use shaderank::parallel::{ExecutionStrategy, pool_size};
//!
//! let strategy = ExecutionStrategy::Parallel { workers: pool_size(8, 80) };
//! let doubled = strategy
//!     .execute(vec![1, 2, 3], |x, _worker_id| x * 2, None::<fn(usize, usize, usize)>)
//!     .unwrap();
//! assert_eq!(doubled, vec![2, 4, 6]);
//! ```

pub mod core;
pub mod progress;

pub use self::core::{ExecutionStrategy, ParallelExecutor, SequentialExecutor, pool_size};
pub use self::progress::ProgressReporter;
