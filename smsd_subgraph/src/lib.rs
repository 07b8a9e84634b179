//! Subgraph extraction and the matching-oracle seam.
//!
//! - [`extract_subgraph`] cuts the induced subgraph over a set of atoms.
//! - [`MatchingOracle`] is the capability the comparison engine calls to
//!   obtain [`AtomMapping`]s. [`BacktrackOracle`] is a small reference
//!   implementation of it.

mod backtrack;
mod extract;
mod mapping;
mod oracle;

pub use backtrack::BacktrackOracle;
pub use extract::{Fragment, extract_subgraph};
pub use mapping::{AtomMapping, MappingError};
pub use oracle::{MatchSet, MatchingOracle, OracleError, OracleMatch};
