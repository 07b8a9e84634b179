//! SMILES reader.
//!
//! Supports the organic subset, bracket atoms (isotope and chirality are
//! read and discarded), explicit bonds, branches, ring closures including
//! `%nn` labels, and `.` disconnections. Bond direction marks `/` `\` are
//! read as single bonds. Implicit hydrogens are not computed for organic
//! subset atoms.

use std::collections::HashMap;

use smsd_common::{Atom, AtomIdx, BondOrder, Molecule};

use crate::SmilesError;

/// Parse a SMILES string into a [`Molecule`].
///
/// # Errors
///
/// Returns [`SmilesError`] describing the first syntax problem.
pub fn parse_smiles(input: &str) -> Result<Molecule, SmilesError> {
    Parser::new(input).parse()
}

struct RingOpen {
    atom: AtomIdx,
    order: Option<BondOrder>,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    mol: Molecule,
    prev: Option<AtomIdx>,
    branches: Vec<Option<AtomIdx>>,
    pending_bond: Option<(BondOrder, usize)>,
    rings: HashMap<u32, RingOpen>,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.trim().chars().collect(),
            pos: 0,
            mol: Molecule::new(),
            prev: None,
            branches: Vec::new(),
            pending_bond: None,
            rings: HashMap::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn unexpected(&self) -> SmilesError {
        match self.peek() {
            Some(ch) => SmilesError::UnexpectedChar { ch, pos: self.pos },
            None => SmilesError::DanglingBond(self.pos),
        }
    }

    fn parse(mut self) -> Result<Molecule, SmilesError> {
        while let Some(c) = self.peek() {
            match c {
                '(' => {
                    if self.prev.is_none() {
                        return Err(SmilesError::BranchWithoutAtom(self.pos));
                    }
                    self.branches.push(self.prev);
                    self.pos += 1;
                }
                ')' => {
                    let Some(prev) = self.branches.pop() else {
                        return Err(SmilesError::UnmatchedParen(self.pos));
                    };
                    if let Some((_, at)) = self.pending_bond {
                        return Err(SmilesError::DanglingBond(at));
                    }
                    self.prev = prev;
                    self.pos += 1;
                }
                '-' | '=' | '#' | ':' | '/' | '\\' => {
                    if self.pending_bond.is_some() {
                        return Err(self.unexpected());
                    }
                    let order = match c {
                        '=' => BondOrder::Double,
                        '#' => BondOrder::Triple,
                        ':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending_bond = Some((order, self.pos));
                    self.pos += 1;
                }
                '.' => {
                    if let Some((_, at)) = self.pending_bond {
                        return Err(SmilesError::DanglingBond(at));
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                '0'..='9' | '%' => {
                    let at = self.pos;
                    let label = self.ring_label()?;
                    let Some(atom) = self.prev else {
                        return Err(SmilesError::RingWithoutAtom(at));
                    };
                    self.ring_bond(atom, label)?;
                }
                '[' => {
                    let atom = self.bracket_atom()?;
                    self.attach(atom)?;
                }
                _ => {
                    let atom = self.organic_atom()?;
                    self.attach(atom)?;
                }
            }
        }

        if !self.branches.is_empty() {
            return Err(SmilesError::UnclosedBranch);
        }
        if let Some((_, at)) = self.pending_bond {
            return Err(SmilesError::DanglingBond(at));
        }
        if let Some(label) = self.rings.keys().min() {
            return Err(SmilesError::UnclosedRing(*label));
        }
        Ok(self.mol)
    }

    fn default_order(&self, a: AtomIdx, b: AtomIdx) -> BondOrder {
        let aromatic = |i| self.mol.atom(i).is_some_and(Atom::is_aromatic);
        if aromatic(a) && aromatic(b) {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        }
    }

    fn attach(&mut self, atom: Atom) -> Result<(), SmilesError> {
        let idx = self.mol.add_atom(atom);
        match (self.prev, self.pending_bond.take()) {
            (Some(prev), pending) => {
                let order = pending.map_or_else(|| self.default_order(prev, idx), |(o, _)| o);
                self.mol.add_bond(prev, idx, order)?;
            }
            (None, Some((_, at))) => return Err(SmilesError::DanglingBond(at)),
            (None, None) => {}
        }
        self.prev = Some(idx);
        Ok(())
    }

    fn ring_label(&mut self) -> Result<u32, SmilesError> {
        if self.peek() == Some('%') {
            let tens = self.peek_at(1).and_then(|c| c.to_digit(10));
            let ones = self.peek_at(2).and_then(|c| c.to_digit(10));
            let (Some(tens), Some(ones)) = (tens, ones) else {
                return Err(self.unexpected());
            };
            self.pos += 3;
            return Ok(tens * 10 + ones);
        }
        let digit = self.peek().and_then(|c| c.to_digit(10));
        let Some(digit) = digit else {
            return Err(self.unexpected());
        };
        self.pos += 1;
        Ok(digit)
    }

    fn ring_bond(&mut self, atom: AtomIdx, label: u32) -> Result<(), SmilesError> {
        let pending = self.pending_bond.take().map(|(o, _)| o);
        let Some(open) = self.rings.remove(&label) else {
            self.rings.insert(label, RingOpen { atom, order: pending });
            return Ok(());
        };

        let order = match (pending, open.order) {
            (Some(a), Some(b)) if a != b => return Err(SmilesError::RingBondConflict(label)),
            (Some(o), _) | (None, Some(o)) => o,
            (None, None) => self.default_order(open.atom, atom),
        };
        self.mol.add_bond(open.atom, atom, order)?;
        Ok(())
    }

    fn organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let two: String = self.chars.iter().skip(self.pos).take(2).collect();
        if two == "Cl" || two == "Br" {
            self.pos += 2;
            return Ok(Atom::new(two));
        }

        let Some(c) = self.peek() else {
            return Err(self.unexpected());
        };
        let atom = match c {
            'B' | 'C' | 'N' | 'O' | 'P' | 'S' | 'F' | 'I' => Atom::new(c.to_string()),
            'b' | 'c' | 'n' | 'o' | 'p' | 's' => {
                Atom::new(c.to_ascii_uppercase().to_string()).aromatic(true)
            }
            _ => return Err(self.unexpected()),
        };
        self.pos += 1;
        Ok(atom)
    }

    fn bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let start = self.pos;
        let invalid = || SmilesError::InvalidBracketAtom(start);
        self.pos += 1; // '['

        // isotope
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }

        let mut atom = match self.bump().ok_or_else(invalid)? {
            c if c.is_ascii_uppercase() => {
                let mut symbol = c.to_string();
                if let Some(l) = self.peek().filter(char::is_ascii_lowercase) {
                    symbol.push(l);
                    self.pos += 1;
                }
                Atom::new(symbol)
            }
            c if c.is_ascii_lowercase() => {
                let mut symbol = c.to_ascii_uppercase().to_string();
                let pair = (c, self.peek());
                if matches!(pair, ('s', Some('e')) | ('a', Some('s'))) {
                    symbol.extend(self.bump());
                }
                Atom::new(symbol).aromatic(true)
            }
            _ => return Err(invalid()),
        };

        // chirality
        while self.peek() == Some('@') {
            self.pos += 1;
        }

        if self.peek() == Some('H') {
            self.pos += 1;
            let count = self.number().unwrap_or(1);
            atom = atom.with_hydrogens(u8::try_from(count).map_err(|_| invalid())?);
        }

        if let Some(sign @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let magnitude = match self.number() {
                Some(n) => n,
                None => {
                    let mut n = 1;
                    while self.peek() == Some(sign) {
                        self.pos += 1;
                        n += 1;
                    }
                    n
                }
            };
            let magnitude = i8::try_from(magnitude).map_err(|_| invalid())?;
            atom = atom.with_charge(if sign == '-' { -magnitude } else { magnitude });
        }

        // atom class
        if self.peek() == Some(':') {
            self.pos += 1;
            self.number().ok_or_else(invalid)?;
        }

        if self.bump() != Some(']') {
            return Err(invalid());
        }
        Ok(atom)
    }

    fn number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
            self.pos += 1;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use smsd_common::BondOrder;

    use super::*;

    #[rstest]
    #[case("CCO", 3, 2)]
    #[case("C1=CC=CC=C1", 6, 6)]
    #[case("c1ccccc1", 6, 6)]
    #[case("CC(C)(C)O", 5, 4)]
    #[case("C.C", 2, 0)]
    #[case("C%10CC%10", 3, 3)]
    #[case("[H]C([H])([H])[H]", 5, 4)]
    #[case("O=C(NC1=CC=CC(=C1)Br)C=2C=C([N+](=O)[O-])SC=2", 18, 19)]
    #[case("", 0, 0)]
    fn test_atom_and_bond_counts(#[case] smiles: &str, #[case] atoms: usize, #[case] bonds: usize) {
        let mol = parse_smiles(smiles).unwrap();
        assert_eq!(mol.atom_count(), atoms, "{smiles}");
        assert_eq!(mol.bond_count(), bonds, "{smiles}");
    }

    #[test]
    fn test_aromatic_bonds_are_implicit() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert!(mol.bonds().iter().all(|b| b.order() == BondOrder::Aromatic));
        assert!(mol.atoms().iter().all(|a| a.is_aromatic() && a.symbol() == "C"));
    }

    #[test]
    fn test_ring_closure_bond_order() {
        let mol = parse_smiles("C=1CCCCC=1").unwrap();
        let closure = mol.bond_between(AtomIdx::new(0), AtomIdx::new(5)).unwrap();
        assert_eq!(closure.order(), BondOrder::Double);
    }

    #[test]
    fn test_bracket_atom_details() {
        let mol = parse_smiles("[13C@@H3][N+]([O-])=O").unwrap();
        let c = mol.atom(AtomIdx::new(0)).unwrap();
        assert_eq!((c.symbol(), c.hydrogens(), c.charge()), ("C", 3, 0));
        assert_eq!(mol.atom(AtomIdx::new(1)).unwrap().charge(), 1);
        assert_eq!(mol.atom(AtomIdx::new(2)).unwrap().charge(), -1);
    }

    #[test]
    fn test_two_letter_elements() {
        let mol = parse_smiles("ClCBr[Se][se]").unwrap();
        let symbols: Vec<&str> = mol.atoms().iter().map(Atom::symbol).collect();
        assert_eq!(symbols, vec!["Cl", "C", "Br", "Se", "Se"]);
    }

    #[rstest]
    #[case("C(C", SmilesError::UnclosedBranch)]
    #[case("C)", SmilesError::UnmatchedParen(1))]
    #[case("C1CC", SmilesError::UnclosedRing(1))]
    #[case("=C", SmilesError::DanglingBond(0))]
    #[case("CC=", SmilesError::DanglingBond(2))]
    #[case("(C)", SmilesError::BranchWithoutAtom(0))]
    #[case("1CC", SmilesError::RingWithoutAtom(0))]
    #[case("[Na", SmilesError::InvalidBracketAtom(0))]
    #[case("C=1CC#1", SmilesError::RingBondConflict(1))]
    #[case("CXC", SmilesError::UnexpectedChar { ch: 'X', pos: 1 })]
    fn test_syntax_errors(#[case] smiles: &str, #[case] expected: SmilesError) {
        assert_eq!(parse_smiles(smiles), Err(expected));
    }

    #[test]
    fn test_graph_errors_surface() {
        assert!(matches!(
            parse_smiles("C11"),
            Err(SmilesError::Graph(_))
        ));
    }
}
