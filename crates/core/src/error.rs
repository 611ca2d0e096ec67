//! Error types for ragkit.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! splitting and serialization failures.

use thiserror::Error;

/// Unified error type for ragkit.
///
/// Fallible functions return `Result<T, AppError>`. Splitting itself is
/// total over valid configuration, so most errors surface at construction
/// time or at the filesystem edge.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (including invalid splitter settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document splitting errors
    #[error("Split error: {0}")]
    Split(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
