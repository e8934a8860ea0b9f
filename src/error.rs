//! Error types for the hadley library.
//!
//! This module defines a single error enum covering every failure a caller
//! can observe. Invalid ranges and mismatched shapes are programmer errors
//! and are reported immediately, never coerced.

use thiserror::Error;

/// The main error type for hadley operations.
#[derive(Error, Debug)]
pub enum HadleyError {
    /// Position or sampling range outside `0 <= lo < hi <= 1`
    #[error("Invalid range: {message}")]
    InvalidRange { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// A ramp was requested with no samples
    #[error("Cannot build a color ramp from zero samples")]
    EmptyRamp,

    /// Array shapes that must agree do not
    #[error("Shape mismatch: {message}")]
    ShapeMismatch { message: String },

    /// A required spatial or temporal axis could not be discovered
    #[error("Axis not found: {message}")]
    AxisNotFound { message: String },

    /// Field name that does not resolve to a known field kind
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// Time units or calendar dates that cannot be interpreted
    #[error("Invalid time: {message}")]
    InvalidTime { message: String },

    /// Statistical test failures
    #[error("Statistics error: {message}")]
    Statistics { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Array construction errors
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Convenience type alias for Results with HadleyError
pub type Result<T> = std::result::Result<T, HadleyError>;
