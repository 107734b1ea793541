//! Error types for documentation generation.

use thiserror::Error;

/// Errors that can occur while generating or writing documentation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the OpenAPI document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// An endpoint description is inconsistent with its route pattern.
    #[error("Invalid operation '{operation_id}': {reason}")]
    InvalidOperation {
        /// The operation ID that is invalid.
        operation_id: String,
        /// The reason the operation is invalid.
        reason: String,
    },

    /// IO error when writing documentation files.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error() {
        let err: DocsError = serde_json::from_str::<String>("invalid")
            .unwrap_err()
            .into();
        assert!(matches!(err, DocsError::SerializationError(_)));
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_invalid_operation_error() {
        let err = DocsError::InvalidOperation {
            operation_id: "getStage".to_string(),
            reason: "missing parameter".to_string(),
        };
        assert!(err.to_string().contains("getStage"));
        assert!(err.to_string().contains("missing parameter"));
    }
}
