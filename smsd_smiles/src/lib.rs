//! SMILES input and output for the comparison engine.
//!
//! [`parse`] turns a SMILES string into a [`Molecule`], and
//! [`SmilesWriter`] plugs into the engine as its fragment serializer.

mod error;
mod parser;
mod writer;

pub use error::SmilesError;
pub use parser::parse_smiles;
pub use writer::{SmilesWriter, write_smiles};

use smsd_common::{Molecule, ParseError};

/// Parse one input, reporting failures as [`ParseError`].
///
/// # Errors
///
/// Returns [`ParseError`] carrying the offending input and the reason.
pub fn parse(input: &str) -> Result<Molecule, ParseError> {
    parse_smiles(input).map_err(|e| {
        tracing::debug!("rejecting input {input:?}: {e}");
        e.into_parse_error(input)
    })
}

/// Parse every input, keeping one result per input in order.
pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Vec<Result<Molecule, ParseError>> {
    inputs.iter().map(|s| parse(s.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_keeps_input() {
        let err = parse("C1CC").unwrap_err();
        assert_eq!(err.input, "C1CC");
        assert!(err.reason.contains("ring 1"));
    }

    #[test]
    fn test_parse_all_preserves_order() {
        let results = parse_all(&["CC", "C(", "O"]);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().atom_count(), 1);
    }
}
