//! Shared data model for Dialogue Expander content.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_document};
