//! Error types and small helpers shared across the crate.

pub mod error;
pub mod sanitize;

pub use error::*;
pub use sanitize::*;
