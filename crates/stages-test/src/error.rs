//! Test error types.

use thiserror::Error;

/// Errors that can occur while driving the app in tests.
#[derive(Debug, Error)]
pub enum TestError {
    /// The app could not be assembled.
    #[error("Setup error: {0}")]
    Setup(#[from] stages_server::ServerError),

    /// Request body serialization failed.
    #[error("Request build error: {0}")]
    RequestBuild(String),

    /// Response body reading failed.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TestError::BodyRead("connection reset".to_string());
        assert_eq!(err.to_string(), "Body read error: connection reset");

        let err = TestError::RequestBuild("bad".to_string());
        assert!(err.to_string().contains("Request build error"));
    }

    #[test]
    fn test_json_source() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = TestError::from(json_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
