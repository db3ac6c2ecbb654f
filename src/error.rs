//! Error types.

use thiserror::Error;

/// Decoding aborted before a value tree could be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A file payload was submitted where text was expected.
    #[error("unsupported form value at `{path}`: got file `{filename}`, only text values are supported")]
    UnsupportedValue { path: String, filename: String },
}

/// Problem while reading a submission from an external representation.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("invalid submission document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("submission document must be an object or an array of [key, value] pairs")]
    Shape,
}

/// Problem while loading decoder configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// A dotted field path that does not exist in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("`{path}` has no field `{field}`")]
    UnknownField { path: String, field: String },

    #[error("`{segment}` is not a valid index into array `{path}`")]
    InvalidIndex { path: String, segment: String },

    #[error("`{path}` is a leaf, cannot descend into `{segment}`")]
    NotAContainer { path: String, segment: String },
}
