//! SMILES writer.
//!
//! Two passes over the molecule: a depth-first layout that fixes the
//! spanning forest and the ring-closure bonds, then a writing pass that
//! emits atoms, branches and ring digits in the same order. Ring digits
//! are reused as soon as they are closed, lowest free digit first.

use std::collections::HashMap;

use smsd_common::{Atom, AtomIdx, BondOrder, FragmentSerializer, Molecule, SerializeError};

const ORGANIC: &[&str] = &["B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"];
const AROMATIC_ORGANIC: &[&str] = &["B", "C", "N", "O", "P", "S"];
const MAX_RING_DIGIT: usize = 99;

/// [`FragmentSerializer`] that renders fragments as SMILES.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmilesWriter;

impl SmilesWriter {
    /// Creates the writer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl FragmentSerializer for SmilesWriter {
    fn serialize(&self, fragment: &Molecule) -> Result<String, SerializeError> {
        write_smiles(fragment)
    }
}

/// Render `mol` as a SMILES string.
///
/// Components are joined with `.`, each rooted at its lowest atom index.
/// The empty molecule renders as the empty string.
///
/// # Errors
///
/// Fails with [`SerializeError::Unsupported`] when more than 99 ring
/// closures are open at once.
pub fn write_smiles(mol: &Molecule) -> Result<String, SerializeError> {
    let layout = Layout::build(mol);
    let mut writer = Writer {
        mol,
        layout: &layout,
        digits: HashMap::new(),
        in_use: vec![false; MAX_RING_DIGIT + 1],
        out: String::new(),
    };

    for (n, root) in layout.roots.iter().enumerate() {
        if n > 0 {
            writer.out.push('.');
        }
        writer.write_from(*root)?;
    }

    tracing::trace!("wrote {} as {}", mol, writer.out);
    Ok(writer.out)
}

/// Result of the depth-first pass.
struct Layout {
    roots: Vec<AtomIdx>,
    children: Vec<Vec<AtomIdx>>,
    /// Ring bonds (by bond index) opened at each atom.
    ring_opens: Vec<Vec<usize>>,
    /// Ring bonds (by bond index) closed at each atom.
    ring_closes: Vec<Vec<usize>>,
}

impl Layout {
    fn build(mol: &Molecule) -> Self {
        let n = mol.atom_count();
        let mut layout = Self {
            roots: Vec::new(),
            children: vec![Vec::new(); n],
            ring_opens: vec![Vec::new(); n],
            ring_closes: vec![Vec::new(); n],
        };
        let mut visited = vec![false; n];
        let mut ring_bond = vec![false; mol.bond_count()];
        let neighbours: Vec<Vec<(AtomIdx, usize)>> = mol
            .atom_indices()
            .map(|atom| sorted_neighbours(mol, atom))
            .collect();

        for root in mol.atom_indices() {
            if visited[root.as_usize()] {
                continue;
            }
            layout.roots.push(root);
            visited[root.as_usize()] = true;

            // (atom, parent, next neighbour slot)
            let mut stack: Vec<(AtomIdx, Option<AtomIdx>, usize)> = vec![(root, None, 0)];
            while let Some(top) = stack.last_mut() {
                let (atom, parent, slot) = *top;
                let Some(&(next, bond)) = neighbours[atom.as_usize()].get(slot) else {
                    stack.pop();
                    continue;
                };
                top.2 += 1;

                if Some(next) == parent {
                    continue;
                }
                if !visited[next.as_usize()] {
                    visited[next.as_usize()] = true;
                    layout.children[atom.as_usize()].push(next);
                    stack.push((next, Some(atom), 0));
                } else if !ring_bond[bond] {
                    ring_bond[bond] = true;
                    layout.ring_opens[next.as_usize()].push(bond);
                    layout.ring_closes[atom.as_usize()].push(bond);
                }
            }
        }
        layout
    }
}

fn sorted_neighbours(mol: &Molecule, atom: AtomIdx) -> Vec<(AtomIdx, usize)> {
    let mut neighbours: Vec<(AtomIdx, usize)> = mol.neighbor_bonds(atom).collect();
    neighbours.sort_unstable();
    neighbours
}

struct Writer<'m> {
    mol: &'m Molecule,
    layout: &'m Layout,
    digits: HashMap<usize, usize>,
    in_use: Vec<bool>,
    out: String,
}

impl Writer<'_> {
    fn write_from(&mut self, root: AtomIdx) -> Result<(), SerializeError> {
        enum Step {
            Open,
            Atom(AtomIdx, Option<AtomIdx>),
            Close,
        }

        let mut stack = vec![Step::Atom(root, None)];
        while let Some(step) = stack.pop() {
            let (atom, parent) = match step {
                Step::Open => {
                    self.out.push('(');
                    continue;
                }
                Step::Close => {
                    self.out.push(')');
                    continue;
                }
                Step::Atom(atom, parent) => (atom, parent),
            };

            if let Some(parent) = parent {
                let symbol = self.bond_symbol(parent, atom);
                self.out.push_str(symbol);
            }
            self.write_atom(atom);
            self.write_rings(atom)?;

            // every child but the last is a parenthesised branch
            let children = &self.layout.children[atom.as_usize()];
            for (i, child) in children.iter().enumerate().rev() {
                let branch = i + 1 < children.len();
                if branch {
                    stack.push(Step::Close);
                }
                stack.push(Step::Atom(*child, Some(atom)));
                if branch {
                    stack.push(Step::Open);
                }
            }
        }
        Ok(())
    }

    fn write_atom(&mut self, idx: AtomIdx) {
        if let Some(atom) = self.mol.atom(idx) {
            self.out.push_str(&atom_token(atom));
        }
    }

    fn write_rings(&mut self, atom: AtomIdx) -> Result<(), SerializeError> {
        let mut released = Vec::new();
        for &bond in &self.layout.ring_closes[atom.as_usize()] {
            if let Some(digit) = self.digits.remove(&bond) {
                push_digit(&mut self.out, digit);
                released.push(digit);
            }
        }

        for &bond in &self.layout.ring_opens[atom.as_usize()] {
            let Some(digit) = (1..=MAX_RING_DIGIT).find(|d| !self.in_use[*d]) else {
                return Err(SerializeError::unsupported(format!(
                    "more than {MAX_RING_DIGIT} open ring closures"
                )));
            };
            self.in_use[digit] = true;
            self.digits.insert(bond, digit);

            let b = &self.mol.bonds()[bond];
            let symbol = self.bond_symbol(b.begin(), b.end());
            self.out.push_str(symbol);
            push_digit(&mut self.out, digit);
        }

        for digit in released {
            self.in_use[digit] = false;
        }
        Ok(())
    }

    fn bond_symbol(&self, a: AtomIdx, b: AtomIdx) -> &'static str {
        let aromatic = |i| self.mol.atom(i).is_some_and(Atom::is_aromatic);
        let both_aromatic = aromatic(a) && aromatic(b);
        match self.mol.bond_between(a, b).map(|bond| bond.order()) {
            Some(BondOrder::Single) if both_aromatic => "-",
            Some(BondOrder::Double) => "=",
            Some(BondOrder::Triple) => "#",
            Some(BondOrder::Aromatic) if !both_aromatic => ":",
            _ => "",
        }
    }
}

fn push_digit(out: &mut String, digit: usize) {
    if digit < 10 {
        out.push_str(&digit.to_string());
    } else {
        out.push_str(&format!("%{digit}"));
    }
}

fn atom_token(atom: &Atom) -> String {
    let symbol = atom.symbol();
    let organic = if atom.is_aromatic() {
        AROMATIC_ORGANIC.contains(&symbol)
    } else {
        ORGANIC.contains(&symbol)
    };
    let needs_bracket = !organic
        || atom.charge() != 0
        || (atom.is_aromatic() && symbol != "C" && atom.hydrogens() > 0);

    let written = if atom.is_aromatic() {
        symbol.to_ascii_lowercase()
    } else {
        symbol.to_owned()
    };
    if !needs_bracket {
        return written;
    }

    let mut token = format!("[{written}");
    match atom.hydrogens() {
        0 => {}
        1 => token.push('H'),
        h => token.push_str(&format!("H{h}")),
    }
    match atom.charge() {
        0 => {}
        1 => token.push('+'),
        -1 => token.push('-'),
        c if c > 0 => token.push_str(&format!("+{c}")),
        c => token.push_str(&format!("-{}", c.unsigned_abs())),
    }
    token.push(']');
    token
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use smsd_common::DEMO_SMILES;

    use super::*;
    use crate::parse_smiles;

    fn rewrite(smiles: &str) -> String {
        write_smiles(&parse_smiles(smiles).unwrap()).unwrap()
    }

    #[rstest]
    #[case("CCO", "CCO")]
    #[case("c1ccccc1", "c1ccccc1")]
    #[case("C1=CC=CC=C1", "C1=CC=CC=C1")]
    #[case("CC(C)(C)O", "CC(C)(C)O")]
    #[case("C[N+](=O)[O-]", "C[N+](=O)[O-]")]
    #[case("C.C", "C.C")]
    #[case("C1CC1C1CC1", "C1CC1C1CC1")]
    #[case("c1cc[nH]c1", "c1cc[nH]c1")]
    #[case("c1ccccc1-c1ccccc1", "c1ccccc1-c1ccccc1")]
    #[case("[Na+].[Cl-]", "[Na+].[Cl-]")]
    #[case("C#N", "C#N")]
    fn test_canonical_examples(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(rewrite(input), expected);
    }

    #[test]
    fn test_empty_molecule() {
        assert_eq!(write_smiles(&Molecule::new()), Ok(String::new()));
    }

    #[test]
    fn test_demo_set_survives_a_reparse() {
        for smiles in DEMO_SMILES {
            let mol = parse_smiles(smiles).unwrap();
            let reparsed = parse_smiles(&write_smiles(&mol).unwrap()).unwrap();
            assert_eq!(reparsed.atom_count(), mol.atom_count(), "{smiles}");
            assert_eq!(reparsed.bond_count(), mol.bond_count(), "{smiles}");
        }
    }

    #[test]
    fn test_bond_indices_follow_insertion_not_layout() {
        // the double bond is inserted first but laid out last
        let mut mol = Molecule::new();
        let atoms: Vec<AtomIdx> = (0..3).map(|_| mol.add_atom(Atom::new("C"))).collect();
        mol.add_bond(atoms[1], atoms[2], BondOrder::Double).unwrap();
        mol.add_bond(atoms[0], atoms[1], BondOrder::Single).unwrap();
        mol.add_bond(atoms[0], atoms[2], BondOrder::Single).unwrap();

        assert_eq!(write_smiles(&mol).unwrap(), "C1C=C1");
    }

    #[test]
    fn test_writer_through_the_trait() {
        let writer: Box<dyn FragmentSerializer> = Box::new(SmilesWriter::new());
        let mol = parse_smiles("OCC").unwrap();
        assert_eq!(writer.serialize(&mol).unwrap(), "OCC");
    }
}
