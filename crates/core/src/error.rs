//! Error types for the ISA evidence workspace.
//!
//! A single error enum covers configuration, I/O, retrieval, embedding,
//! verification and serialization failures. Retrieval and I/O failures are
//! runtime conditions a caller may degrade around; dimension mismatches and
//! configuration errors are programmer mistakes that must surface immediately.

use thiserror::Error;

/// Unified error type for the ISA workspace.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A retriever (vector or lexical) failed
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Embedding generation failed
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Embedding vectors of different dimensionality were compared
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Claim extraction or citation verification failed
    #[error("Verification error: {0}")]
    Verification(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether a pipeline may degrade around this error instead of aborting.
    ///
    /// Retriever and I/O failures are downgraded to empty results at the
    /// fan-out boundary. Configuration errors, dimension mismatches and
    /// cancellation always propagate.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Retrieval(_) | AppError::Io(_) | AppError::Embedding(_)
        )
    }
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
    fn test_dimension_mismatch_message() {
        let err = AppError::DimensionMismatch {
            expected: 384,
            actual: 768,
        };
        assert_eq!(
            err.to_string(),
            "Embedding dimension mismatch: expected 384, got 768"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_retrieval_is_recoverable() {
        assert!(AppError::Retrieval("timeout".to_string()).is_recoverable());
        assert!(!AppError::Config("bad".to_string()).is_recoverable());
        assert!(!AppError::Cancelled.is_recoverable());
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
