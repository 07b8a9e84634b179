//! The matching-oracle capability.
//!
//! The comparison engine never looks inside a matching algorithm. It only
//! needs something that, given two molecules and the filter flags, answers
//! with zero or more [`AtomMapping`]s. Any search (VF-style, McGregor, a
//! scripted test stub) can sit behind [`MatchingOracle`].

use smsd_common::{ChemFilters, MatchMode, Molecule};
use thiserror::Error;

use crate::{AtomMapping, MappingError};

/// Errors reported by a matching oracle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The search itself failed.
    #[error("search failed: {0}")]
    Search(String),
    /// The oracle answered with a mapping that does not fit the molecules.
    #[error("invalid mapping: {0}")]
    InvalidMapping(#[from] MappingError),
    /// The oracle panicked; the payload is rendered as text.
    #[error("oracle panicked: {0}")]
    Panicked(String),
}

impl OracleError {
    /// Create a search error.
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }
}

/// One mapping plus the per-match side-channel metrics the oracle offers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OracleMatch {
    /// Query-to-target correspondence.
    pub mapping: AtomMapping,
    /// Stereo agreement score, when the oracle computes one.
    pub stereo_score: Option<f64>,
    /// Size of the matched fragment as the oracle counts it.
    pub fragment_size: Option<usize>,
}

impl From<AtomMapping> for OracleMatch {
    fn from(mapping: AtomMapping) -> Self {
        Self {
            mapping,
            ..Default::default()
        }
    }
}

/// Everything one oracle call produced.
///
/// The metrics are informational only. They are logged by the engine and
/// never influence which fragments are emitted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchSet {
    /// Matches in the order the oracle ranks them.
    pub matches: Vec<OracleMatch>,
    /// Whether the best match disagrees on stereochemistry.
    pub stereo_mismatch: bool,
    /// Tanimoto similarity of the two molecules.
    pub tanimoto_similarity: Option<f64>,
    /// Euclidean distance between the two molecules.
    pub euclidean_distance: Option<f64>,
}

impl MatchSet {
    /// A result with no matches.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wraps plain mappings without metrics.
    pub fn from_mappings(mappings: impl IntoIterator<Item = AtomMapping>) -> Self {
        Self {
            matches: mappings.into_iter().map(OracleMatch::from).collect(),
            ..Default::default()
        }
    }

    /// Number of matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// True when the oracle found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// A substructure / maximum-common-substructure search backend.
///
/// One oracle instance serves every worker of a batch concurrently, hence
/// the `Send + Sync` bound.
pub trait MatchingOracle: Send + Sync {
    /// All maximum common substructure matches between `query` and `target`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] if the search cannot complete.
    fn find_all_mcs_matches(
        &self,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError>;

    /// All embeddings of the whole `query` inside `target`.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError`] if the search cannot complete.
    fn find_all_substructure_matches(
        &self,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError>;

    /// Dispatches on `mode`.
    ///
    /// # Errors
    ///
    /// Propagates the error of the selected search.
    fn find_matches(
        &self,
        mode: MatchMode,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError> {
        match mode {
            MatchMode::MaximumCommonSubstructure => {
                self.find_all_mcs_matches(query, target, filters)
            }
            MatchMode::SubstructureSearch => {
                self.find_all_substructure_matches(query, target, filters)
            }
        }
    }
}

impl<O: MatchingOracle + ?Sized> MatchingOracle for &O {
    fn find_all_mcs_matches(
        &self,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError> {
        (**self).find_all_mcs_matches(query, target, filters)
    }

    fn find_all_substructure_matches(
        &self,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError> {
        (**self).find_all_substructure_matches(query, target, filters)
    }
}

impl<O: MatchingOracle + ?Sized> MatchingOracle for Box<O> {
    fn find_all_mcs_matches(
        &self,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError> {
        (**self).find_all_mcs_matches(query, target, filters)
    }

    fn find_all_substructure_matches(
        &self,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError> {
        (**self).find_all_substructure_matches(query, target, filters)
    }
}
