//! Error Handling Module
//!
//! - Core error types (`EnhanceError`, `ErrorKind`)
//! - Classification of raw transport failures into the typed taxonomy
//! - Conversions from common error types

mod classify;
mod conversions;
pub mod types;

pub use classify::classify;
pub use types::*;

/// Convenience alias used across the crate.
pub type Result<T, E = EnhanceError> = std::result::Result<T, E>;
