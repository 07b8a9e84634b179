//! Error types for the external collaborators (parser and serializer).

use thiserror::Error;

/// An input string could not be turned into a [`crate::Molecule`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot parse `{input}`: {reason}")]
pub struct ParseError {
    /// The offending input, verbatim.
    pub input: String,
    /// Human-readable cause.
    pub reason: String,
}

impl ParseError {
    /// Create a parse error for `input`.
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// A fragment could not be rendered to its string form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SerializeError {
    /// The fragment uses a feature the serializer cannot express.
    #[error("unsupported feature: {0}")]
    Unsupported(String),
    /// Any other serializer failure.
    #[error("{0}")]
    Other(String),
}

impl SerializeError {
    /// Create an unsupported-feature error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a generic serializer error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
