//! Bounded worker pool that runs tasks and hands results back in
//! submission order.
//!
//! Completion order across workers is arbitrary. Results are re-sequenced
//! by the indexed parallel collect, so the caller always receives result
//! `i` for task `i`.
//!
//! There is no per-task timeout: a task runs until its oracle returns. A
//! backtracking search that never finishes holds its worker for the rest
//! of the batch.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use smsd_common::Config;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while building a [`Scheduler`].
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A pool needs at least one worker.
    #[error("max concurrency must be at least 1")]
    ZeroConcurrency,
    /// The thread pool could not be created.
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] ThreadPoolBuildError),
}

/// A fixed-size worker pool.
#[derive(Debug)]
pub struct Scheduler {
    pool: ThreadPool,
    max_concurrency: usize,
}

impl Scheduler {
    /// A pool of exactly `max_concurrency` workers.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::ZeroConcurrency`] for a bound of zero, or
    /// [`SchedulerError::Pool`] if the threads cannot be spawned.
    pub fn new(max_concurrency: usize) -> Result<Self, SchedulerError> {
        if max_concurrency == 0 {
            return Err(SchedulerError::ZeroConcurrency);
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(max_concurrency)
            .thread_name(|i| format!("smsd-worker-{i}"))
            .build()?;
        debug!("scheduler started with {max_concurrency} workers");
        Ok(Self {
            pool,
            max_concurrency,
        })
    }

    /// A pool sized by `config.max_concurrency`, or by the number of
    /// available processing units when unset.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::new`].
    pub fn from_config(config: &Config) -> Result<Self, SchedulerError> {
        let workers = config
            .max_concurrency
            .map_or_else(rayon::current_num_threads, usize::from);
        Self::new(workers)
    }

    /// Number of workers.
    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Runs `run` on every task and blocks until all of them are done.
    ///
    /// Exactly one result per task, in task order.
    pub fn run_all<T, R, F>(&self, tasks: &[T], run: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        info!(
            "dispatching {} tasks on {} workers",
            tasks.len(),
            self.max_concurrency
        );
        let results: Vec<R> = self
            .pool
            .install(|| tasks.par_iter().with_max_len(1).map(&run).collect());
        debug!("all {} tasks finished", results.len());
        results
    }
}
