//! The batch entry point.
//!
//! A [`Driver`] owns the comparator and the worker pool. Each call to
//! [`Driver::compare_all`] is one batch: every pair of the inputs gets
//! exactly one [`PairResult`] in the returned report.

use smsd_common::{Config, FragmentSerializer, Molecule, ParseError};
use smsd_subgraph::MatchingOracle;
use tracing::{info, warn};

use crate::{
    BatchProgress, BatchReport, Comparator, PairError, PairResult, PairTask, Scheduler,
    SchedulerError, enumerate_pairs,
};

/// Runs a whole input set: enumerates pairs, schedules the comparisons and
/// collects a [`BatchReport`].
///
/// Batches are independent: a driver may run several at once from different
/// threads, each with its own [`BatchProgress`].
#[derive(Debug)]
pub struct Driver<O, S> {
    comparator: Comparator<O, S>,
    scheduler: Scheduler,
}

impl<O: MatchingOracle, S: FragmentSerializer> Driver<O, S> {
    /// Builds a driver whose pool is sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError`] if the worker pool cannot be created.
    pub fn new(oracle: O, serializer: S, config: Config) -> Result<Self, SchedulerError> {
        let scheduler = Scheduler::from_config(&config)?;
        Ok(Self {
            comparator: Comparator::new(oracle, serializer, config),
            scheduler,
        })
    }

    /// The configuration in use.
    pub const fn config(&self) -> &Config {
        self.comparator.config()
    }

    /// Worker count of the underlying pool.
    pub const fn max_concurrency(&self) -> usize {
        self.scheduler.max_concurrency()
    }

    /// Compares every pair of `inputs`.
    ///
    /// A pair touching an input that failed to parse is reported as a
    /// `ParseFailure` without being dispatched.
    pub fn compare_all(&self, inputs: &[Result<Molecule, ParseError>]) -> BatchReport {
        self.compare_all_with_progress(inputs, &BatchProgress::new())
    }

    /// Like [`Driver::compare_all`], reporting into `progress` while the
    /// batch runs. `progress` is reset to the new pair count first.
    pub fn compare_all_with_progress(
        &self,
        inputs: &[Result<Molecule, ParseError>],
        progress: &BatchProgress,
    ) -> BatchReport {
        let slots: Vec<Result<&Molecule, &ParseError>> = inputs.iter().map(Result::as_ref).collect();
        self.run(&slots, progress)
    }

    /// Compares every pair of already-parsed molecules.
    pub fn compare_molecules(&self, molecules: &[Molecule]) -> BatchReport {
        self.compare_molecules_with_progress(molecules, &BatchProgress::new())
    }

    /// Like [`Driver::compare_molecules`], reporting into `progress`.
    pub fn compare_molecules_with_progress(
        &self,
        molecules: &[Molecule],
        progress: &BatchProgress,
    ) -> BatchReport {
        let slots: Vec<Result<&Molecule, &ParseError>> = molecules.iter().map(Ok).collect();
        self.run(&slots, progress)
    }

    fn run(
        &self,
        inputs: &[Result<&Molecule, &ParseError>],
        progress: &BatchProgress,
    ) -> BatchReport {
        let pairs = enumerate_pairs(inputs.len());
        info!(
            "comparing {} inputs: {} pairs, mode {:?}",
            inputs.len(),
            pairs.len(),
            self.config().mode
        );
        progress.reset(pairs.len() as u64);

        let mut tasks = Vec::with_capacity(pairs.len());
        let mut results = Vec::new();
        for (left, right) in pairs {
            let unusable = match (inputs[left], inputs[right]) {
                (Ok(l), Ok(r)) => {
                    tasks.push(PairTask::new(left, right, l, r));
                    continue;
                }
                (Err(source), _) => (left, source),
                (_, Err(source)) => (right, source),
            };
            let (index, source) = unusable;
            let result = PairResult::failed(PairError::Parse {
                left,
                right,
                index,
                source: source.clone(),
            });
            warn!(left, right, "skipping pair: input {index} did not parse");
            progress.record(&result);
            results.push(result);
        }

        let compared = self.scheduler.run_all(&tasks, |task| {
            let result = self.comparator.compare(task);
            progress.record(&result);
            result
        });

        results.extend(compared);
        results.sort_by_key(PairResult::pair);

        let report = BatchReport::new(results);
        info!(
            submitted = report.summary.submitted,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            fragments = report.summary.fragments,
            "batch finished"
        );
        report
    }
}
