//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or validating a [`StagesConfig`](crate::StagesConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("failed to read configuration file: {path}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, or a key the schema does not know.
    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or a key the schema does not know.
    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted key, e.g. `server.http_addr`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `STAGES__*` override could not be parsed.
    #[error("failed to parse environment variable {var}: {reason}")]
    EnvVar {
        /// Variable name.
        var: String,
        /// Expected shape.
        reason: String,
    },

    /// The `.env` file exists but could not be loaded.
    #[error("failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// Neither `toml` nor `json`.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl ConfigError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_var(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvVar {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_error() {
        let err = ConfigError::not_found("/path/to/stages.toml");
        assert!(err.to_string().contains("/path/to/stages.toml"));
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid("server.http_addr", "invalid socket address");
        assert_eq!(
            err.to_string(),
            "invalid configuration value for server.http_addr: invalid socket address"
        );
    }

    #[test]
    fn test_env_var() {
        let err = ConfigError::env_var("STAGES__SERVER__REQUEST_TIMEOUT_MS", "expected integer");
        assert!(err.to_string().contains("STAGES__SERVER__REQUEST_TIMEOUT_MS"));
    }
}
