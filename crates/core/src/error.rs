//! Error types for Quorum.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, LLM calls, the knowledge store,
//! the agent registry, and the prompt system.

use thiserror::Error;

/// Unified error type for Quorum.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors, including structured output that does not
    /// match the expected shape
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge store and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Agent registry errors
    #[error("Registry error: {0}")]
    Registry(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

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
