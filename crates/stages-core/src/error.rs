//! Error types for the construction stages API.
//!
//! [`ApiError`] is the single error type handlers return. Each variant maps
//! to one HTTP status and renders into the wire envelope
//! `{"error": {"code": <status>, "message": <text>, "errors": [<text>...]}}`,
//! where `errors` only appears for validation failures.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// Broad classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// One or more field rules were violated.
    Validation,
    /// Resource or route not found.
    NotFound,
    /// The request body could not be parsed.
    Malformed,
    /// The verb is not supported.
    MethodNotAllowed,
    /// The persistence layer failed.
    Internal,
}

impl ErrorCategory {
    /// Returns the HTTP status code for this category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Malformed => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for the API.
///
/// # Example
///
/// ```
/// use stages_core::ApiError;
///
/// let error = ApiError::validation(vec!["Name is required".to_string()]);
/// let envelope = error.to_envelope();
/// assert_eq!(envelope.error.code, 422);
/// assert_eq!(envelope.error.errors.unwrap(), vec!["Name is required"]);
/// ```
#[derive(Error, Debug)]
pub enum ApiError {
    /// Payload validation failed.
    #[error("{message}")]
    Validation {
        /// Summary message.
        message: String,
        /// One message per violated rule, in rule order.
        errors: Vec<String>,
    },

    /// The resource does not exist or has been soft-deleted.
    #[error("{message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// The request body was empty or not valid JSON.
    #[error("{message}")]
    MalformedRequest {
        /// Human-readable error message.
        message: String,
    },

    /// The store failed. The source is logged but never sent to clients.
    #[error("{message}")]
    Persistence {
        /// Summary safe to show to clients.
        message: String,
        /// The underlying store error.
        #[source]
        source: anyhow::Error,
    },

    /// The verb is outside the supported set.
    #[error("Method not allowed")]
    MethodNotAllowed {
        /// The rejected verb.
        method: String,
    },

    /// No route matched the path.
    #[error("Route not found")]
    RouteNotFound {
        /// The unmatched path.
        path: String,
    },
}

impl ApiError {
    /// Creates a validation error from collected rule messages.
    #[must_use]
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates the not found error for a missing or deleted stage.
    #[must_use]
    pub fn stage_not_found() -> Self {
        Self::not_found("Construction stage not found")
    }

    /// Creates a malformed request error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Creates a persistence error wrapping the store failure.
    pub fn persistence(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Persistence {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Creates a method not allowed error.
    #[must_use]
    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            method: method.into(),
        }
    }

    /// Creates a route not found error.
    #[must_use]
    pub fn route_not_found(path: impl Into<String>) -> Self {
        Self::RouteNotFound { path: path.into() }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::NotFound { .. } | Self::RouteNotFound { .. } => ErrorCategory::NotFound,
            Self::MalformedRequest { .. } => ErrorCategory::Malformed,
            Self::MethodNotAllowed { .. } => ErrorCategory::MethodNotAllowed,
            Self::Persistence { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to the serializable wire envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let errors = match self {
            Self::Validation { errors, .. } => Some(errors.clone()),
            _ => None,
        };
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.status_code().as_u16(),
                message: self.to_string(),
                errors,
            },
        }
    }
}

/// Serializable error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// HTTP status code.
    pub code: u16,
    /// Human-readable error message.
    pub message: String,
    /// Per-rule validation messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Serializable success envelope, `{"success": {"code": 200, "message": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    /// The success details.
    pub success: SuccessDetail,
}

/// Success detail within an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessDetail {
    /// HTTP status code.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
}

impl SuccessEnvelope {
    /// Creates a 200 envelope with `message`.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: SuccessDetail {
                code: StatusCode::OK.as_u16(),
                message: message.into(),
            },
        }
    }
}
