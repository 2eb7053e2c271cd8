//! Error types for mapping declaration and execution.

use thiserror::Error;

/// Errors surfaced while building or applying a mapping.
#[derive(Debug, Error)]
pub enum MapError {
    /// A getter, setter, or named guard referenced a field the object
    /// does not expose.
    #[error("no such field: {0}")]
    NoSuchField(String),

    /// A rule referenced a computation that was never registered on its
    /// definition.
    #[error("unknown computation '{name}' in mapping '{mapping}'")]
    UnknownComputation { mapping: String, name: String },

    /// No definition is registered under the requested name.
    #[error("unknown mapping: {0}")]
    UnknownMapping(String),

    /// A value could not be converted to or from a typed field.
    #[error("type conversion failed: {0}")]
    Conversion(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;
