//! Atom-to-atom correspondence between a query and a target molecule.

use std::collections::HashSet;

use smsd_common::AtomIdx;
use thiserror::Error;

/// Structural problems found in an [`AtomMapping`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    /// A query-side index does not exist in the query molecule.
    #[error("query atom {0} is out of range ({1} atoms)")]
    QueryOutOfRange(AtomIdx, usize),
    /// A target-side index does not exist in the target molecule.
    #[error("target atom {0} is out of range ({1} atoms)")]
    TargetOutOfRange(AtomIdx, usize),
    /// A query atom is mapped more than once.
    #[error("query atom {0} is mapped twice")]
    DuplicateQuery(AtomIdx),
    /// Two query atoms share one target atom.
    #[error("target atom {0} is mapped twice")]
    DuplicateTarget(AtomIdx),
}

/// A match: query atom indices paired with target atom indices.
///
/// Pairs keep the order in which they were inserted. Only the matching
/// oracle builds these; the comparison engine reads them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AtomMapping {
    pairs: Vec<(AtomIdx, AtomIdx)>,
}

impl AtomMapping {
    /// An empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Builds a mapping from `(query, target)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (AtomIdx, AtomIdx)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Number of mapped atoms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The `(query, target)` pairs in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(AtomIdx, AtomIdx)] {
        &self.pairs
    }

    /// Query-side indices (the mapping's keys).
    pub fn query_atoms(&self) -> impl Iterator<Item = AtomIdx> + '_ {
        self.pairs.iter().map(|(q, _)| *q)
    }

    /// Target-side indices (the mapping's values).
    pub fn target_atoms(&self) -> impl Iterator<Item = AtomIdx> + '_ {
        self.pairs.iter().map(|(_, t)| *t)
    }

    /// The target atom `query` is mapped to.
    #[must_use]
    pub fn target_of(&self, query: AtomIdx) -> Option<AtomIdx> {
        self.pairs.iter().find(|(q, _)| *q == query).map(|(_, t)| *t)
    }

    /// Sorted target-side indices; two mappings onto the same target atoms
    /// share a signature.
    #[must_use]
    pub fn signature(&self) -> Vec<usize> {
        let mut sig: Vec<usize> = self.target_atoms().map(AtomIdx::as_usize).collect();
        sig.sort_unstable();
        sig
    }

    /// Checks that the mapping is injective and in range for molecules with
    /// `query_len` and `target_len` atoms.
    ///
    /// # Errors
    ///
    /// Returns the first [`MappingError`] found.
    pub fn validate(&self, query_len: usize, target_len: usize) -> Result<(), MappingError> {
        let mut seen_query = HashSet::with_capacity(self.pairs.len());
        let mut seen_target = HashSet::with_capacity(self.pairs.len());

        for &(q, t) in &self.pairs {
            if q.as_usize() >= query_len {
                return Err(MappingError::QueryOutOfRange(q, query_len));
            }
            if t.as_usize() >= target_len {
                return Err(MappingError::TargetOutOfRange(t, target_len));
            }
            if !seen_query.insert(q) {
                return Err(MappingError::DuplicateQuery(q));
            }
            if !seen_target.insert(t) {
                return Err(MappingError::DuplicateTarget(t));
            }
        }
        Ok(())
    }
}

impl FromIterator<(AtomIdx, AtomIdx)> for AtomMapping {
    fn from_iter<I: IntoIterator<Item = (AtomIdx, AtomIdx)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen, quickcheck};

    #[derive(Clone, Debug)]
    struct ArbitraryMapping(AtomMapping);

    impl Arbitrary for ArbitraryMapping {
        fn arbitrary(g: &mut Gen) -> Self {
            let len = usize::arbitrary(g) % 12;
            let pairs = (0..len).map(|_| {
                (
                    AtomIdx::new(u32::arbitrary(g) % 16),
                    AtomIdx::new(u32::arbitrary(g) % 16),
                )
            });
            Self(AtomMapping::from_pairs(pairs))
        }
    }

    quickcheck! {
        fn prop_valid_mapping_fits_both_sides(m: ArbitraryMapping) -> bool {
            match m.0.validate(16, 16) {
                Ok(()) => m.0.len() <= 16 && m.0.signature().windows(2).all(|w| w[0] < w[1]),
                Err(_) => true,
            }
        }

        fn prop_signature_ignores_order(m: ArbitraryMapping) -> bool {
            let reversed: AtomMapping = m.0.pairs().iter().rev().copied().collect();
            reversed.signature() == m.0.signature()
        }
    }
}
