//! Per-pair outcomes and the failure taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};
use smsd_common::{ParseError, SerializeError};
use smsd_subgraph::OracleError;
use thiserror::Error;

/// The four ways a pair can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// One of the two inputs could not be parsed.
    ParseFailure,
    /// The matching oracle failed or answered with an invalid match.
    OracleFailure,
    /// Induced-subgraph construction failed.
    ExtractionFailure,
    /// A fragment could not be turned into a string.
    SerializationFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ParseFailure => "ParseFailure",
            Self::OracleFailure => "OracleFailure",
            Self::ExtractionFailure => "ExtractionFailure",
            Self::SerializationFailure => "SerializationFailure",
        };
        f.write_str(name)
    }
}

/// A failed pair, with the indices of the pair it belongs to.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PairError {
    /// Input `index` (one of `left`, `right`) never became a molecule.
    #[error("pair ({left}, {right}): input {index} is unusable: {source}")]
    Parse {
        /// Left index of the pair.
        left: usize,
        /// Right index of the pair.
        right: usize,
        /// The input that failed.
        index: usize,
        /// Parser error.
        source: ParseError,
    },
    /// The oracle failed.
    #[error("pair ({left}, {right}): {source}")]
    Oracle {
        /// Left index of the pair.
        left: usize,
        /// Right index of the pair.
        right: usize,
        /// Oracle error.
        source: OracleError,
    },
    /// Extraction failed.
    #[error("pair ({left}, {right}): extraction failed: {reason}")]
    Extraction {
        /// Left index of the pair.
        left: usize,
        /// Right index of the pair.
        right: usize,
        /// What went wrong.
        reason: String,
    },
    /// The serializer failed.
    #[error("pair ({left}, {right}): serialization failed: {source}")]
    Serialization {
        /// Left index of the pair.
        left: usize,
        /// Right index of the pair.
        right: usize,
        /// Serializer error.
        source: SerializeError,
    },
}

impl PairError {
    /// Failure category.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Parse { .. } => FailureKind::ParseFailure,
            Self::Oracle { .. } => FailureKind::OracleFailure,
            Self::Extraction { .. } => FailureKind::ExtractionFailure,
            Self::Serialization { .. } => FailureKind::SerializationFailure,
        }
    }

    /// The `(left, right)` indices of the failed pair.
    #[must_use]
    pub const fn pair(&self) -> (usize, usize) {
        match self {
            Self::Parse { left, right, .. }
            | Self::Oracle { left, right, .. }
            | Self::Extraction { left, right, .. }
            | Self::Serialization { left, right, .. } => (*left, *right),
        }
    }
}

/// Outcome of one pair: its fragment strings, or why it failed.
///
/// An empty fragment list means the oracle found nothing, which is not a
/// failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairResult {
    /// Index of the left input.
    pub left: usize,
    /// Index of the right input.
    pub right: usize,
    /// Fragment strings in oracle order, or the failure.
    pub outcome: Result<Vec<String>, PairError>,
}

impl PairResult {
    /// A successful result.
    #[must_use]
    pub const fn fragments(left: usize, right: usize, fragments: Vec<String>) -> Self {
        Self {
            left,
            right,
            outcome: Ok(fragments),
        }
    }

    /// A failed result; the indices are taken from the error.
    #[must_use]
    pub const fn failed(error: PairError) -> Self {
        let (left, right) = error.pair();
        Self {
            left,
            right,
            outcome: Err(error),
        }
    }

    /// `(left, right)`.
    #[must_use]
    pub const fn pair(&self) -> (usize, usize) {
        (self.left, self.right)
    }

    /// True when the pair did not fail.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Failure category, if any.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.outcome.as_ref().err().map(PairError::kind)
    }

    /// Fragment strings of a successful pair; empty for failures.
    #[must_use]
    pub fn fragment_strings(&self) -> &[String] {
        self.outcome.as_deref().unwrap_or_default()
    }
}

/// Totals for one batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Pairs produced by the enumerator.
    pub submitted: usize,
    /// Pairs with a fragment list (possibly empty).
    pub succeeded: usize,
    /// Pairs with a failure.
    pub failed: usize,
    /// Fragment strings across all successful pairs.
    pub fragments: usize,
}

impl BatchSummary {
    /// Tallies `results`.
    #[must_use]
    pub fn from_results(results: &[PairResult]) -> Self {
        results.iter().fold(
            Self {
                submitted: results.len(),
                ..Self::default()
            },
            |mut acc, r| {
                match &r.outcome {
                    Ok(fragments) => {
                        acc.succeeded += 1;
                        acc.fragments += fragments.len();
                    }
                    Err(_) => acc.failed += 1,
                }
                acc
            },
        )
    }
}

/// Everything a batch produced, in pair order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// One result per enumerated pair, ascending by `(left, right)`.
    pub results: Vec<PairResult>,
    /// Totals over `results`.
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Builds a report and its summary.
    #[must_use]
    pub fn new(results: Vec<PairResult>) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self { results, summary }
    }

    /// All fragment strings, flattened in pair order with each pair's
    /// fragments kept together.
    pub fn fragments(&self) -> impl Iterator<Item = &str> + '_ {
        self.results
            .iter()
            .flat_map(PairResult::fragment_strings)
            .map(String::as_str)
    }

    /// The failed pairs' errors, in pair order.
    pub fn failures(&self) -> impl Iterator<Item = &PairError> + '_ {
        self.results.iter().filter_map(|r| r.outcome.as_ref().err())
    }

    /// The result for `(left, right)`, if that pair was enumerated.
    #[must_use]
    pub fn get(&self, left: usize, right: usize) -> Option<&PairResult> {
        self.results
            .binary_search_by_key(&(left, right), PairResult::pair)
            .ok()
            .map(|i| &self.results[i])
    }
}
