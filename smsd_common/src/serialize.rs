//! Capability for turning a fragment into its external string form.

use crate::{Molecule, SerializeError};

/// Renders a [`Molecule`] as a string (for example a SMILES string).
///
/// Implementations are shared by every worker of a batch, so they must be
/// `Send + Sync` and must not rely on interior mutability for correctness.
pub trait FragmentSerializer: Send + Sync {
    /// Serialize one fragment.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] when the fragment cannot be expressed.
    fn serialize(&self, fragment: &Molecule) -> Result<String, SerializeError>;
}

impl<S: FragmentSerializer + ?Sized> FragmentSerializer for &S {
    fn serialize(&self, fragment: &Molecule) -> Result<String, SerializeError> {
        (**self).serialize(fragment)
    }
}

impl<S: FragmentSerializer + ?Sized> FragmentSerializer for Box<S> {
    fn serialize(&self, fragment: &Molecule) -> Result<String, SerializeError> {
        (**self).serialize(fragment)
    }
}
