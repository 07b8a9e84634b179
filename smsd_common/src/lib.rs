//! Shared data model and configuration for the SMSD workspace.
//!
//! This crate provides the molecular graph type, the batch configuration,
//! the serializer capability and the demo input set used across the
//! workspace.

mod config;
mod demo;
mod error;
mod molecule;
mod serialize;

pub use crate::config::*;
pub use crate::demo::*;
pub use crate::error::*;
pub use crate::molecule::*;
pub use crate::serialize::*;
