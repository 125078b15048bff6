//! Error types for the Math Tutor Agent.
//!
//! This module defines a unified error enum covering all error categories in
//! the application: configuration, I/O, LLM, knowledge base, web search,
//! guardrails, and serialization.

use thiserror::Error;

/// Unified error type for the Math Tutor Agent.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// Web search provider errors
    #[error("Search error: {0}")]
    Search(String),

    /// Input or output guardrail rejections
    #[error("Guard rejection: {0}")]
    Guard(String),

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Llm("connection refused".to_string());
        assert_eq!(err.to_string(), "LLM error: connection refused");

        let err = AppError::Guard("off-topic input".to_string());
        assert_eq!(err.to_string(), "Guard rejection: off-topic input");
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: AppError = parse_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
