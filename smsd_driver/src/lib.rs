//! Concurrent pairwise comparison of a molecule set.
//!
//! Every unordered pair of inputs becomes a [`PairTask`]. Tasks run on a
//! bounded [`Scheduler`]; each one asks a [`smsd_subgraph::MatchingOracle`]
//! for matches, cuts the matched fragments out and serializes them. Every
//! pair ends up with exactly one [`PairResult`], failures included.

mod driver;
mod pairs;
mod progress;
mod result;
mod scheduler;
mod task;

pub use driver::Driver;
pub use pairs::{enumerate_pairs, pair_count};
pub use progress::{BatchProgress, ProgressSnapshot};
pub use result::{BatchReport, BatchSummary, FailureKind, PairError, PairResult};
pub use scheduler::{Scheduler, SchedulerError};
pub use task::{Comparator, PairTask, preprocess};
