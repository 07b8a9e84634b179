use std::sync::Once;

use rstest::rstest;
use smsd_common::{ChemFilters, MatchMode, Molecule};
use smsd_smiles::parse_smiles;
use smsd_subgraph::{BacktrackOracle, MatchingOracle, extract_subgraph};

static INIT: Once = Once::new();

fn setup_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn mol(smiles: &str) -> Molecule {
    parse_smiles(smiles).unwrap()
}

#[rstest]
#[case("CCO", "CCCO", 3)]
#[case("C1=CC=CC=C1", "C1=CC=NC=C1", 5)]
#[case("C1=CC=CC=C1", "C1=CC=C(C=C1)C1=CC=CC=C1", 6)]
#[case("O=NN(C=1C=CC=CC=1)C", "C1=CC=CC=C1", 6)]
#[case("CCO", "ClC(Cl)Cl", 1)]
fn test_mcs_size(#[case] query: &str, #[case] target: &str, #[case] expected: usize) {
    setup_test_logging();
    let oracle = BacktrackOracle::new();
    let matches = oracle
        .find_all_mcs_matches(&mol(query), &mol(target), &ChemFilters::default())
        .unwrap();

    assert!(!matches.is_empty());
    for m in &matches.matches {
        assert_eq!(m.mapping.len(), expected, "{query} vs {target}");
    }
}

#[rstest]
#[case("CO", "OCCO", 2)]
#[case("C1=CC=CC=C1", "C1=CC=C(C=C1)C1=CC=CC=C1", 2)]
#[case("N", "CCO", 0)]
fn test_substructure_count(#[case] query: &str, #[case] target: &str, #[case] expected: usize) {
    setup_test_logging();
    let oracle = BacktrackOracle::new();
    let matches = oracle
        .find_matches(
            MatchMode::SubstructureSearch,
            &mol(query),
            &mol(target),
            &ChemFilters::default(),
        )
        .unwrap();
    assert_eq!(matches.len(), expected);
}

#[test]
fn test_mappings_extract_to_the_same_fragment_on_both_sides() {
    setup_test_logging();
    let query = mol("O=C(OCCN(C)C)C=C");
    let target = mol("CCO");
    let oracle = BacktrackOracle::new();
    let matches = oracle
        .find_all_mcs_matches(&query, &target, &ChemFilters::default())
        .unwrap();

    for m in &matches.matches {
        m.mapping
            .validate(query.atom_count(), target.atom_count())
            .unwrap();
        let left = extract_subgraph(&query, m.mapping.query_atoms());
        let right = extract_subgraph(&target, m.mapping.target_atoms());
        assert_eq!(left.atom_count(), right.atom_count());
        assert_eq!(left.bond_count(), right.bond_count());
    }
}

#[test]
fn test_similarity_metrics_are_reported() {
    let oracle = BacktrackOracle::new();
    let a = mol("CCO");
    let matches = oracle
        .find_all_mcs_matches(&a, &a, &ChemFilters::default())
        .unwrap();
    assert_eq!(matches.tanimoto_similarity, Some(1.0));
    assert_eq!(matches.euclidean_distance, Some(0.0));
}
