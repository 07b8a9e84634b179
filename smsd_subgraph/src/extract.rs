//! Induced-subgraph extraction.
//!
//! Given a molecule and a set of atom indices, [`extract_subgraph`] keeps
//! exactly those atoms and every bond whose two endpoints are both kept.
//! The result only depends on the *set* of indices: duplicates and
//! enumeration order are irrelevant, and indices outside the molecule are
//! ignored.

use contracts::*;
use smsd_common::{AtomIdx, Molecule};

/// A fragment cut out of a source molecule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    molecule: Molecule,
    /// For each fragment atom, the index it has in the source molecule.
    origin: Vec<AtomIdx>,
}

impl Fragment {
    /// The fragment as a stand-alone molecule.
    #[must_use]
    pub const fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    /// Source index of every fragment atom, ascending.
    #[must_use]
    pub fn origin(&self) -> &[AtomIdx] {
        &self.origin
    }

    /// Number of atoms in the fragment.
    #[must_use]
    pub const fn atom_count(&self) -> usize {
        self.molecule.atom_count()
    }

    /// Number of bonds in the fragment.
    #[must_use]
    pub const fn bond_count(&self) -> usize {
        self.molecule.bond_count()
    }

    /// True for the zero-atom fragment.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.molecule.is_empty()
    }
}

/// Extracts the subgraph of `source` induced by `selection`.
///
/// Linear in the size of `source` plus the size of `selection`.
#[debug_ensures(ret.origin.windows(2).all(|w| w[0] < w[1]))]
#[debug_ensures(every_bond_in_source(source, &ret))]
pub fn extract_subgraph(
    source: &Molecule,
    selection: impl IntoIterator<Item = AtomIdx>,
) -> Fragment {
    let mut keep = vec![false; source.atom_count()];
    for idx in selection {
        if let Some(slot) = keep.get_mut(idx.as_usize()) {
            *slot = true;
        }
    }

    let (molecule, origin) = source.induced_subgraph(&keep);
    tracing::trace!(
        "extracted {} of {} atoms, {} of {} bonds",
        molecule.atom_count(),
        source.atom_count(),
        molecule.bond_count(),
        source.bond_count()
    );
    Fragment { molecule, origin }
}

fn every_bond_in_source(source: &Molecule, fragment: &Fragment) -> bool {
    fragment.molecule.bonds().iter().all(|bond| {
        let begin = fragment.origin[bond.begin().as_usize()];
        let end = fragment.origin[bond.end().as_usize()];
        source
            .bond_between(begin, end)
            .is_some_and(|b| b.order() == bond.order())
    })
}


#[cfg(test)]
mod property_tests {
    use std::collections::HashSet;

    use quickcheck::{Arbitrary, Gen, quickcheck};
    use smsd_common::{Atom, BondOrder};

    use super::*;

    #[derive(Clone, Debug)]
    struct ArbitraryMolecule(Molecule);

    impl Arbitrary for ArbitraryMolecule {
        fn arbitrary(g: &mut Gen) -> Self {
            let symbols = ["C", "N", "O", "S"];
            let orders = [BondOrder::Single, BondOrder::Double, BondOrder::Aromatic];
            let n = usize::arbitrary(g) % 12;
            let mut mol = Molecule::new();
            for _ in 0..n {
                mol.add_atom(Atom::new(*g.choose(&symbols).unwrap()));
            }
            if n > 1 {
                for _ in 0..(usize::arbitrary(g) % (2 * n)) {
                    let a = AtomIdx::from(usize::arbitrary(g) % n);
                    let b = AtomIdx::from(usize::arbitrary(g) % n);
                    // self bonds and duplicates are rejected, which is fine here
                    let _ = mol.add_bond(a, b, *g.choose(&orders).unwrap());
                }
            }
            Self(mol)
        }
    }

    #[derive(Clone, Debug)]
    struct Selection(Vec<AtomIdx>);

    impl Arbitrary for Selection {
        fn arbitrary(g: &mut Gen) -> Self {
            let len = usize::arbitrary(g) % 16;
            Self(
                (0..len)
                    .map(|_| AtomIdx::new(u32::arbitrary(g) % 14))
                    .collect(),
            )
        }
    }

    quickcheck! {
        fn prop_atom_count_matches_selection(m: ArbitraryMolecule, s: Selection) -> bool {
            let expected: HashSet<AtomIdx> =
                s.0.iter().copied().filter(|i| m.0.contains(*i)).collect();
            extract_subgraph(&m.0, s.0.clone()).atom_count() == expected.len()
        }

        fn prop_bonds_stay_inside_selection(m: ArbitraryMolecule, s: Selection) -> bool {
            let selected: HashSet<AtomIdx> = s.0.iter().copied().collect();
            let fragment = extract_subgraph(&m.0, s.0.clone());
            fragment.molecule().bonds().iter().all(|b| {
                selected.contains(&fragment.origin()[b.begin().as_usize()])
                    && selected.contains(&fragment.origin()[b.end().as_usize()])
            })
        }

        fn prop_bonds_are_induced(m: ArbitraryMolecule, s: Selection) -> bool {
            let selected: HashSet<AtomIdx> = s.0.iter().copied().collect();
            let expected = m.0.bonds().iter().filter(|b| {
                selected.contains(&b.begin()) && selected.contains(&b.end())
            }).count();
            extract_subgraph(&m.0, s.0.clone()).bond_count() == expected
        }

        fn prop_extraction_is_idempotent(m: ArbitraryMolecule, s: Selection) -> bool {
            extract_subgraph(&m.0, s.0.clone()) == extract_subgraph(&m.0, s.0.clone())
        }
    }
}
