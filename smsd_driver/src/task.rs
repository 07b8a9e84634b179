//! The comparison task: one pair in, one [`PairResult`] out.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{AssertUnwindSafe, catch_unwind};

use contracts::*;
use smsd_common::{AtomIdx, Config, FragmentSerializer, FragmentSide, Molecule, SerializeError};
use smsd_subgraph::{MatchSet, MatchingOracle, OracleError, extract_subgraph};
use tracing::{debug, warn};

use crate::{PairError, PairResult};

/// One unit of work: two inputs and their positions in the input sequence.
///
/// Borrows the shared, read-only input molecules.
#[derive(Clone, Copy, Debug)]
pub struct PairTask<'g> {
    left_index: usize,
    right_index: usize,
    left: &'g Molecule,
    right: &'g Molecule,
}

impl<'g> PairTask<'g> {
    /// Creates a task for the pair `(left_index, right_index)`.
    #[debug_requires(left_index < right_index, "pairs are ordered and never self-pairs")]
    #[must_use]
    pub fn new(
        left_index: usize,
        right_index: usize,
        left: &'g Molecule,
        right: &'g Molecule,
    ) -> Self {
        Self {
            left_index,
            right_index,
            left,
            right,
        }
    }

    /// `(left, right)` indices.
    #[must_use]
    pub const fn pair(&self) -> (usize, usize) {
        (self.left_index, self.right_index)
    }

    /// The left (query) molecule.
    #[must_use]
    pub const fn left(&self) -> &'g Molecule {
        self.left
    }

    /// The right (target) molecule.
    #[must_use]
    pub const fn right(&self) -> &'g Molecule {
        self.right
    }
}

/// Reduces an input before matching. The original is never modified; a
/// private copy is made only when hydrogens are stripped.
#[must_use]
pub fn preprocess(molecule: &Molecule, strip_hydrogens: bool) -> Cow<'_, Molecule> {
    if strip_hydrogens {
        Cow::Owned(molecule.without_hydrogens())
    } else {
        Cow::Borrowed(molecule)
    }
}

/// Runs comparison tasks against a matching oracle and a serializer.
///
/// Holds no mutable state: one comparator serves every worker of a batch.
#[derive(Debug)]
pub struct Comparator<O, S> {
    oracle: O,
    serializer: S,
    config: Config,
}

impl<O: MatchingOracle, S: FragmentSerializer> Comparator<O, S> {
    /// Creates a comparator.
    pub const fn new(oracle: O, serializer: S, config: Config) -> Self {
        Self {
            oracle,
            serializer,
            config,
        }
    }

    /// The configuration every comparison uses.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Compares one pair. Never panics because of the oracle or the
    /// serializer: both are run behind `catch_unwind` and any failure is
    /// returned as a typed outcome.
    pub fn compare(&self, task: &PairTask<'_>) -> PairResult {
        let (left, right) = task.pair();
        match self.run(task) {
            Ok(fragments) => {
                debug!(left, right, fragments = fragments.len(), "pair compared");
                PairResult::fragments(left, right, fragments)
            }
            Err(error) => {
                warn!(left, right, kind = %error.kind(), "{error}");
                PairResult::failed(error)
            }
        }
    }

    fn run(&self, task: &PairTask<'_>) -> Result<Vec<String>, PairError> {
        let (left, right) = task.pair();
        let query = preprocess(task.left(), self.config.strip_hydrogens);
        let target = preprocess(task.right(), self.config.strip_hydrogens);

        let oracle_error = |source: OracleError| PairError::Oracle {
            left,
            right,
            source,
        };

        let matches: MatchSet = catch_unwind(AssertUnwindSafe(|| {
            self.oracle
                .find_matches(self.config.mode, &query, &target, &self.config.filters)
        }))
        .map_err(|payload| OracleError::Panicked(panic_message(payload.as_ref())))
        .and_then(|result| result)
        .map_err(oracle_error)?;

        log_metrics(left, right, &matches);

        let mut fragments = Vec::with_capacity(matches.len());
        for m in &matches.matches {
            m.mapping
                .validate(query.atom_count(), target.atom_count())
                .map_err(|e| oracle_error(e.into()))?;

            let (source, selection): (&Molecule, Vec<AtomIdx>) = match self.config.fragment_side {
                FragmentSide::Query => (&*query, m.mapping.query_atoms().collect()),
                FragmentSide::Target => (&*target, m.mapping.target_atoms().collect()),
            };

            let fragment = catch_unwind(AssertUnwindSafe(|| {
                extract_subgraph(source, selection.iter().copied())
            }))
            .map_err(|payload| PairError::Extraction {
                left,
                right,
                reason: panic_message(payload.as_ref()),
            })?;

            if fragment.atom_count() != selection.len() {
                return Err(PairError::Extraction {
                    left,
                    right,
                    reason: format!(
                        "fragment has {} atoms for a selection of {}",
                        fragment.atom_count(),
                        selection.len()
                    ),
                });
            }
            if fragment.is_empty() {
                continue;
            }

            let text = catch_unwind(AssertUnwindSafe(|| {
                self.serializer.serialize(fragment.molecule())
            }))
            .map_err(|payload| SerializeError::other(panic_message(payload.as_ref())))
            .and_then(|result| result)
            .map_err(|source| PairError::Serialization {
                left,
                right,
                source,
            })?;
            fragments.push(text);
        }
        Ok(fragments)
    }
}

fn log_metrics(left: usize, right: usize, matches: &MatchSet) {
    debug!(
        left,
        right,
        matches = matches.len(),
        stereo_mismatch = matches.stereo_mismatch,
        tanimoto = ?matches.tanimoto_similarity,
        euclidean = ?matches.euclidean_distance,
        "oracle answered"
    );
    for (rank, m) in matches.matches.iter().enumerate() {
        debug!(
            left,
            right,
            rank,
            fragment_size = ?m.fragment_size,
            stereo_score = ?m.stereo_score,
            "match"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use smsd_common::{Atom, BondOrder};
    use smsd_subgraph::AtomMapping;

    use super::*;

    /// Answers every call with the mappings it was built with.
    struct FixedOracle(Vec<AtomMapping>);

    impl MatchingOracle for FixedOracle {
        fn find_all_mcs_matches(
            &self,
            _: &Molecule,
            _: &Molecule,
            _: &smsd_common::ChemFilters,
        ) -> Result<MatchSet, OracleError> {
            Ok(MatchSet::from_mappings(self.0.clone()))
        }

        fn find_all_substructure_matches(
            &self,
            query: &Molecule,
            target: &Molecule,
            filters: &smsd_common::ChemFilters,
        ) -> Result<MatchSet, OracleError> {
            self.find_all_mcs_matches(query, target, filters)
        }
    }

    /// Writes "<atoms>/<bonds>".
    struct CountingSerializer;

    impl FragmentSerializer for CountingSerializer {
        fn serialize(&self, fragment: &Molecule) -> Result<String, SerializeError> {
            Ok(format!("{}/{}", fragment.atom_count(), fragment.bond_count()))
        }
    }

    struct PanickingSerializer;

    impl FragmentSerializer for PanickingSerializer {
        fn serialize(&self, _: &Molecule) -> Result<String, SerializeError> {
            panic!("serializer exploded")
        }
    }

    fn chain(n: usize) -> Molecule {
        let mut mol = Molecule::new();
        let atoms: Vec<AtomIdx> = (0..n).map(|_| mol.add_atom(Atom::new("C"))).collect();
        for w in atoms.windows(2) {
            mol.add_bond(w[0], w[1], BondOrder::Single).unwrap();
        }
        mol
    }

    fn mapping(pairs: &[(u32, u32)]) -> AtomMapping {
        pairs
            .iter()
            .map(|&(q, t)| (AtomIdx::new(q), AtomIdx::new(t)))
            .collect()
    }

    #[test]
    fn test_empty_matches_are_skipped() {
        let oracle = FixedOracle(vec![AtomMapping::new(), mapping(&[(0, 0), (1, 1)])]);
        let comparator = Comparator::new(oracle, CountingSerializer, Config::default());
        let (a, b) = (chain(3), chain(4));

        let result = comparator.compare(&PairTask::new(0, 1, &a, &b));
        assert_eq!(result.outcome, Ok(vec!["2/1".to_owned()]));
    }

    #[test]
    fn test_fragment_side_target() {
        // query atoms 0 and 2 are not bonded, target atoms 1 and 2 are
        let oracle = FixedOracle(vec![mapping(&[(0, 1), (2, 2)])]);
        let (a, b) = (chain(3), chain(3));

        let query_side = Comparator::new(
            FixedOracle(oracle.0.clone()),
            CountingSerializer,
            Config::default(),
        );
        let target_side = Comparator::new(
            oracle,
            CountingSerializer,
            Config::builder()
                .fragment_side(FragmentSide::Target)
                .build(),
        );

        let task = PairTask::new(0, 1, &a, &b);
        assert_eq!(query_side.compare(&task).outcome, Ok(vec!["2/0".to_owned()]));
        assert_eq!(target_side.compare(&task).outcome, Ok(vec!["2/1".to_owned()]));
    }

    #[test]
    fn test_invalid_mapping_is_an_oracle_failure() {
        let oracle = FixedOracle(vec![mapping(&[(0, 0), (1, 0)])]);
        let comparator = Comparator::new(oracle, CountingSerializer, Config::default());
        let (a, b) = (chain(2), chain(2));

        let result = comparator.compare(&PairTask::new(3, 7, &a, &b));
        assert_eq!(result.pair(), (3, 7));
        assert_eq!(
            result.failure_kind(),
            Some(crate::FailureKind::OracleFailure)
        );
    }

    #[test]
    fn test_serializer_panic_is_contained() {
        let oracle = FixedOracle(vec![mapping(&[(0, 0)])]);
        let comparator = Comparator::new(oracle, PanickingSerializer, Config::default());
        let (a, b) = (chain(1), chain(2));

        let result = comparator.compare(&PairTask::new(0, 1, &a, &b));
        match result.outcome {
            Err(PairError::Serialization { source, .. }) => {
                assert_eq!(source, SerializeError::other("serializer exploded"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_hydrogens_are_stripped_from_a_private_copy() {
        let mut methane = Molecule::new();
        let c = methane.add_atom(Atom::new("C"));
        for _ in 0..4 {
            let h = methane.add_atom(Atom::new("H"));
            methane.add_bond(c, h, BondOrder::Single).unwrap();
        }

        let stripped = preprocess(&methane, true);
        assert_eq!(stripped.atom_count(), 1);
        assert_eq!(methane.atom_count(), 5);
        assert!(matches!(preprocess(&methane, false), Cow::Borrowed(_)));
    }
}
