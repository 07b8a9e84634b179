//! Molecular graph model.
//!
//! A [`Molecule`] is an immutable-after-construction graph of [`Atom`]s joined
//! by [`Bond`]s. Atom indices are dense (`0..n`) and never change for the
//! lifetime of a molecule. Operations that drop atoms always build a *new*
//! molecule and report, for every surviving atom, the index it had in the
//! source graph.

use std::fmt;

use contracts::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dense index of an atom inside one [`Molecule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AtomIdx {
    /// The underlying raw integer index.
    inner: u32,
}

impl AtomIdx {
    /// Creates an atom index from a raw integer.
    #[ensures(ret.inner == id)]
    pub const fn new(id: u32) -> Self {
        Self { inner: id }
    }

    /// Returns the index as a usize for array access.
    #[ensures(ret == self.inner as usize)]
    pub const fn as_usize(self) -> usize {
        self.inner as usize
    }
}

impl fmt::Display for AtomIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.inner)
    }
}

impl From<usize> for AtomIdx {
    #[inline]
    fn from(id: usize) -> Self {
        Self { inner: id as u32 }
    }
}

/// Multiplicity of a bond.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondOrder {
    /// Single bond.
    Single,
    /// Double bond.
    Double,
    /// Triple bond.
    Triple,
    /// Delocalised bond inside an aromatic ring.
    Aromatic,
}

/// A single atom (graph node).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    symbol: String,
    aromatic: bool,
    charge: i8,
    /// Hydrogens carried implicitly by this atom (not present as nodes).
    hydrogens: u8,
}

impl Atom {
    /// Creates a neutral, non-aromatic atom of the given element symbol.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            aromatic: false,
            charge: 0,
            hydrogens: 0,
        }
    }

    /// Marks the atom as aromatic.
    #[must_use]
    pub const fn aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = aromatic;
        self
    }

    /// Sets the formal charge.
    #[must_use]
    pub const fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    /// Sets the implicit hydrogen count.
    #[must_use]
    pub const fn with_hydrogens(mut self, hydrogens: u8) -> Self {
        self.hydrogens = hydrogens;
        self
    }

    /// Element symbol, capitalised (`"C"`, `"Cl"`, ...).
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Whether the atom is part of an aromatic system.
    pub const fn is_aromatic(&self) -> bool {
        self.aromatic
    }

    /// Formal charge.
    pub const fn charge(&self) -> i8 {
        self.charge
    }

    /// Implicit hydrogen count.
    pub const fn hydrogens(&self) -> u8 {
        self.hydrogens
    }

    /// True for any hydrogen atom, trivial or not.
    pub fn is_hydrogen(&self) -> bool {
        self.symbol == "H"
    }
}

/// An undirected bond between two distinct atoms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bond {
    begin: AtomIdx,
    end: AtomIdx,
    order: BondOrder,
}

impl Bond {
    /// First endpoint, in insertion order.
    pub const fn begin(&self) -> AtomIdx {
        self.begin
    }

    /// Second endpoint, in insertion order.
    pub const fn end(&self) -> AtomIdx {
        self.end
    }

    /// Bond order.
    pub const fn order(&self) -> BondOrder {
        self.order
    }

    /// Returns the endpoint opposite to `atom`, if `atom` is an endpoint.
    pub fn other(&self, atom: AtomIdx) -> Option<AtomIdx> {
        if atom == self.begin {
            Some(self.end)
        } else if atom == self.end {
            Some(self.begin)
        } else {
            None
        }
    }
}

/// Errors raised while assembling a [`Molecule`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoleculeError {
    /// A bond referenced an atom that does not exist.
    #[error("atom {0} is out of range for a molecule with {1} atoms")]
    AtomOutOfRange(AtomIdx, usize),
    /// A bond joined an atom to itself.
    #[error("atom {0} cannot bond to itself")]
    SelfBond(AtomIdx),
    /// Two atoms were bonded twice.
    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(AtomIdx, AtomIdx),
}

/// A molecular graph.
///
/// Molecules are built once (by a parser or by [`Molecule::induced_subgraph`])
/// and then only read, which makes `&Molecule` safe to share across worker
/// threads without synchronisation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// Per atom: `(neighbour, bond index)` in bond insertion order.
    adjacency: Vec<Vec<(AtomIdx, usize)>>,
}

impl Molecule {
    /// Creates an empty molecule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an atom and returns its index.
    #[ensures(ret.as_usize() == self.atoms.len() - 1)]
    pub fn add_atom(&mut self, atom: Atom) -> AtomIdx {
        let idx = AtomIdx::from(self.atoms.len());
        self.atoms.push(atom);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Adds a bond and returns its index.
    ///
    /// # Errors
    ///
    /// Fails if either endpoint is out of range, if the endpoints are equal,
    /// or if the atoms are already bonded.
    pub fn add_bond(
        &mut self,
        begin: AtomIdx,
        end: AtomIdx,
        order: BondOrder,
    ) -> Result<usize, MoleculeError> {
        for atom in [begin, end] {
            if !self.contains(atom) {
                return Err(MoleculeError::AtomOutOfRange(atom, self.atoms.len()));
            }
        }
        if begin == end {
            return Err(MoleculeError::SelfBond(begin));
        }
        if self.bond_between(begin, end).is_some() {
            return Err(MoleculeError::DuplicateBond(begin, end));
        }
        Ok(self.push_bond(begin, end, order))
    }

    fn push_bond(&mut self, begin: AtomIdx, end: AtomIdx, order: BondOrder) -> usize {
        let bond_idx = self.bonds.len();
        self.bonds.push(Bond { begin, end, order });
        self.adjacency[begin.as_usize()].push((end, bond_idx));
        self.adjacency[end.as_usize()].push((begin, bond_idx));
        bond_idx
    }

    /// Number of atoms.
    pub const fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Number of bonds.
    pub const fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// True when the molecule has no atoms.
    pub const fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// All atoms in index order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// All bonds in insertion order.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Looks up an atom.
    pub fn atom(&self, idx: AtomIdx) -> Option<&Atom> {
        self.atoms.get(idx.as_usize())
    }

    /// Whether `idx` names an atom of this molecule.
    pub const fn contains(&self, idx: AtomIdx) -> bool {
        idx.as_usize() < self.atoms.len()
    }

    /// Iterates over every atom index in ascending order.
    pub fn atom_indices(&self) -> impl Iterator<Item = AtomIdx> + '_ {
        (0..self.atoms.len()).map(AtomIdx::from)
    }

    /// Neighbours of `idx` in bond insertion order. Empty for unknown atoms.
    pub fn neighbors(&self, idx: AtomIdx) -> impl Iterator<Item = AtomIdx> + '_ {
        self.adjacency
            .get(idx.as_usize())
            .into_iter()
            .flatten()
            .map(|(n, _)| *n)
    }

    /// `(neighbour, bond index)` pairs of `idx` in bond insertion order.
    pub fn neighbor_bonds(&self, idx: AtomIdx) -> impl Iterator<Item = (AtomIdx, usize)> + '_ {
        self.adjacency.get(idx.as_usize()).into_iter().flatten().copied()
    }

    /// Number of bonds incident to `idx`.
    pub fn degree(&self, idx: AtomIdx) -> usize {
        self.adjacency.get(idx.as_usize()).map_or(0, Vec::len)
    }

    /// The bond joining `a` and `b`, if any.
    pub fn bond_between(&self, a: AtomIdx, b: AtomIdx) -> Option<&Bond> {
        self.adjacency
            .get(a.as_usize())?
            .iter()
            .find(|(n, _)| *n == b)
            .map(|(_, bond_idx)| &self.bonds[*bond_idx])
    }

    /// Builds the subgraph induced by the atoms whose `keep` flag is set.
    ///
    /// Surviving atoms keep their relative order and are renumbered densely;
    /// a bond survives iff both endpoints do. Returns the new molecule and,
    /// for each new atom, its index in `self`. Runs in `O(atoms + bonds)`.
    #[debug_requires(keep.len() == self.atom_count())]
    #[debug_ensures(ret.0.atom_count() == ret.1.len())]
    #[debug_ensures(ret.0.atom_count() == keep.iter().filter(|k| **k).count())]
    pub fn induced_subgraph(&self, keep: &[bool]) -> (Self, Vec<AtomIdx>) {
        let mut remap: Vec<Option<AtomIdx>> = vec![None; self.atoms.len()];
        let mut induced = Self::new();
        let mut origin = Vec::new();

        for (old, atom) in self.atom_indices().zip(&self.atoms) {
            if keep.get(old.as_usize()).copied().unwrap_or(false) {
                remap[old.as_usize()] = Some(induced.add_atom(atom.clone()));
                origin.push(old);
            }
        }

        for bond in &self.bonds {
            if let (Some(begin), Some(end)) =
                (remap[bond.begin.as_usize()], remap[bond.end.as_usize()])
            {
                induced.push_bond(begin, end, bond.order);
            }
        }

        (induced, origin)
    }

    /// A neutral hydrogen bonded to exactly one non-hydrogen atom.
    ///
    /// Such atoms carry no structural information beyond the hydrogen count
    /// of their neighbour.
    pub fn is_trivial_hydrogen(&self, idx: AtomIdx) -> bool {
        let Some(atom) = self.atom(idx) else {
            return false;
        };
        if !atom.is_hydrogen() || atom.charge() != 0 || self.degree(idx) != 1 {
            return false;
        }
        self.neighbors(idx)
            .all(|n| self.atom(n).is_some_and(|a| !a.is_hydrogen()))
    }

    /// Returns a copy with every trivial hydrogen removed.
    ///
    /// Each removed hydrogen is folded into the implicit hydrogen count of
    /// the atom it was bonded to. `self` is left untouched.
    pub fn without_hydrogens(&self) -> Self {
        let mut keep = vec![true; self.atoms.len()];
        let mut folded = vec![0u8; self.atoms.len()];

        for idx in self.atom_indices() {
            if self.is_trivial_hydrogen(idx) {
                keep[idx.as_usize()] = false;
                for n in self.neighbors(idx) {
                    folded[n.as_usize()] = folded[n.as_usize()].saturating_add(1);
                }
            }
        }

        let (mut stripped, origin) = self.induced_subgraph(&keep);
        for (atom, old) in stripped.atoms.iter_mut().zip(origin) {
            atom.hydrogens = atom.hydrogens.saturating_add(folded[old.as_usize()]);
        }

        tracing::trace!(
            "stripped {} hydrogens ({} -> {} atoms)",
            self.atom_count() - stripped.atom_count(),
            self.atom_count(),
            stripped.atom_count()
        );
        stripped
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Molecule({} atoms, {} bonds)",
            self.atom_count(),
            self.bond_count()
        )
    }
}
