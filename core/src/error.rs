//! Error types for the term-topic matrix store
//!
//! The store is permissive: malformed indexes, duplicate
//! ordering entries and unknown normalization names are sanitized away
//! rather than reported. The variants below cover the few conditions that
//! cannot be sanitized, chiefly imports whose input has the wrong shape.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use thiserror::Error;

/// Matrix store error types
#[derive(Error, Debug)]
pub enum MatrixError {
    /// Import input is neither a dense 2D array nor a list of entries
    #[error("Unsupported import input: {0}")]
    UnsupportedInput(String),

    /// An entry object in a sparse import is missing a numeric field
    #[error("Malformed entry at position {position}: {reason}")]
    MalformedEntry { position: usize, reason: String },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for matrix store operations.
pub type Result<T> = std::result::Result<T, MatrixError>;
