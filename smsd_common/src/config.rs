//! Configuration for a pairwise comparison batch.
//!
//! Fields:
//! - mode: maximum common substructure or query-in-target substructure search.
//! - filters: the chemical filter flags handed to the matching oracle
//!   untouched. The engine never interprets them.
//! - max_concurrency: how many comparisons may run at the same time.
//! - fragment_side: which side of a match the fragment is cut from.
//! - strip_hydrogens: whether trivial hydrogens are removed before matching.
//!
//! Quick examples
//!
//! Defaults (MCS, every filter on, one worker per processing unit):
//! ```
//! use smsd_common::Config;
//! let cfg = Config::default();
//! assert!(cfg.filters.bond_sensitive);
//! ```
//!
//! Substructure search on two workers:
//! ```
//! use smsd_common::{Config, MatchMode};
//! let cfg = Config::builder()
//!     .mode(MatchMode::SubstructureSearch)
//!     .max_concurrency(2)
//!     .build();
//! assert_eq!(cfg.max_concurrency.map(|n| n.get()), Some(2));
//! ```

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Which search the matching oracle runs for each pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMode {
    /// Largest substructure shared by query and target.
    #[default]
    MaximumCommonSubstructure,
    /// Every embedding of the whole query inside the target.
    SubstructureSearch,
}

/// Chemical filter flags forwarded verbatim to the matching oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChemFilters {
    /// Bond orders must agree for a bond to match.
    pub bond_sensitive: bool,
    /// Ring bonds only match ring bonds.
    pub ring_matcher: bool,
    /// Prefer mappings that preserve stereochemistry.
    pub stereo_match: bool,
    /// Prefer mappings with the fewest disconnected fragments.
    pub fragment_minimization: bool,
    /// Prefer mappings with the lowest bond-breaking energy.
    pub energy_minimization: bool,
}

impl Default for ChemFilters {
    fn default() -> Self {
        Self {
            bond_sensitive: true,
            ring_matcher: true,
            stereo_match: true,
            fragment_minimization: true,
            energy_minimization: true,
        }
    }
}

/// Side of a match the fragment is extracted from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentSide {
    /// Cut the fragment out of the query (left) molecule.
    #[default]
    Query,
    /// Cut the fragment out of the target (right) molecule.
    Target,
}

/// Batch configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Search mode.
    pub mode: MatchMode,
    /// Oracle filter flags.
    pub filters: ChemFilters,
    /// Upper bound on concurrently running comparisons. `None` means one
    /// worker per available processing unit.
    pub max_concurrency: Option<NonZeroUsize>,
    /// Side of the match to cut fragments from.
    pub fragment_side: FragmentSide,
    /// Remove trivial hydrogens before matching.
    pub strip_hydrogens: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            filters: ChemFilters::default(),
            max_concurrency: None,
            fragment_side: FragmentSide::default(),
            strip_hydrogens: true,
        }
    }
}

impl Config {
    /// Starts a builder seeded with the defaults.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Incremental [`Config`] construction.
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    inner: Config,
}

impl ConfigBuilder {
    /// Sets the search mode.
    #[must_use]
    pub const fn mode(mut self, mode: MatchMode) -> Self {
        self.inner.mode = mode;
        self
    }

    /// Replaces all filter flags at once.
    #[must_use]
    pub const fn filters(mut self, filters: ChemFilters) -> Self {
        self.inner.filters = filters;
        self
    }

    /// Toggles bond-order sensitivity.
    #[must_use]
    pub const fn bond_sensitive(mut self, on: bool) -> Self {
        self.inner.filters.bond_sensitive = on;
        self
    }

    /// Toggles ring matching.
    #[must_use]
    pub const fn ring_matcher(mut self, on: bool) -> Self {
        self.inner.filters.ring_matcher = on;
        self
    }

    /// Bounds the worker pool. Zero restores the default (one worker per
    /// processing unit).
    #[must_use]
    pub const fn max_concurrency(mut self, workers: usize) -> Self {
        self.inner.max_concurrency = NonZeroUsize::new(workers);
        self
    }

    /// Chooses the side fragments are cut from.
    #[must_use]
    pub const fn fragment_side(mut self, side: FragmentSide) -> Self {
        self.inner.fragment_side = side;
        self
    }

    /// Enables or disables hydrogen stripping.
    #[must_use]
    pub const fn strip_hydrogens(mut self, on: bool) -> Self {
        self.inner.strip_hydrogens = on;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> Config {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filters_are_all_on() {
        let filters = Config::default().filters;
        assert!(filters.bond_sensitive);
        assert!(filters.ring_matcher);
        assert!(filters.stereo_match);
        assert!(filters.fragment_minimization);
        assert!(filters.energy_minimization);
    }

    #[test]
    fn test_builder_overrides() {
        let cfg = Config::builder()
            .mode(MatchMode::SubstructureSearch)
            .bond_sensitive(false)
            .fragment_side(FragmentSide::Target)
            .strip_hydrogens(false)
            .max_concurrency(3)
            .build();

        assert_eq!(cfg.mode, MatchMode::SubstructureSearch);
        assert!(!cfg.filters.bond_sensitive);
        assert!(cfg.filters.ring_matcher);
        assert_eq!(cfg.fragment_side, FragmentSide::Target);
        assert!(!cfg.strip_hydrogens);
        assert_eq!(cfg.max_concurrency, NonZeroUsize::new(3));
    }

    #[test]
    fn test_zero_concurrency_means_default() {
        let cfg = Config::builder().max_concurrency(0).build();
        assert_eq!(cfg.max_concurrency, None);
    }
}
