//! SMILES reader errors.

use smsd_common::{MoleculeError, ParseError};
use thiserror::Error;

/// Errors raised by [`crate::parse_smiles`]. Positions are character offsets.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SmilesError {
    /// A character that cannot start any SMILES token.
    #[error("unexpected character '{ch}' at {pos}")]
    UnexpectedChar {
        /// Offending character.
        ch: char,
        /// Its offset.
        pos: usize,
    },
    /// A bracket atom that is malformed or never closed.
    #[error("malformed bracket atom at {0}")]
    InvalidBracketAtom(usize),
    /// `(` with no atom before it.
    #[error("branch without a preceding atom at {0}")]
    BranchWithoutAtom(usize),
    /// `)` with no matching `(`.
    #[error("unmatched ')' at {0}")]
    UnmatchedParen(usize),
    /// Input ended inside a branch.
    #[error("unclosed branch")]
    UnclosedBranch,
    /// A bond symbol that is not followed by an atom or ring label.
    #[error("dangling bond at {0}")]
    DanglingBond(usize),
    /// A ring label with no atom before it.
    #[error("ring closure without a preceding atom at {0}")]
    RingWithoutAtom(usize),
    /// A ring label that was opened but never closed.
    #[error("ring {0} is never closed")]
    UnclosedRing(u32),
    /// The two ends of a ring closure ask for different bond orders.
    #[error("conflicting bond orders on ring {0}")]
    RingBondConflict(u32),
    /// The resulting graph is invalid (self bond, duplicate bond).
    #[error(transparent)]
    Graph(#[from] MoleculeError),
}

impl SmilesError {
    /// Attach the offending input, producing the workspace-wide parse error.
    pub fn into_parse_error(self, input: &str) -> ParseError {
        ParseError::new(input, self.to_string())
    }
}
