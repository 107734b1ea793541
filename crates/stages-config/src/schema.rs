//! Configuration schema types.
//!
//! Every section rejects unknown keys and fills omitted keys with defaults.

use serde::{Deserialize, Serialize};
use stages_telemetry::LogConfig;

/// HTTP server section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address (e.g., "127.0.0.1:8000").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Per-request timeout in milliseconds, body read included.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum number of concurrent connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            request_timeout_ms: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_connections: default_max_connections(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_max_connections() -> usize {
    1024
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local store, lost on restart.
    Memory,
    /// SQLite database at `database.url`.
    #[default]
    Sqlite,
}

/// Database section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSection {
    /// Which store to use.
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite connection URL.
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Pool size.
    #[serde(default = "default_pool_size")]
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            url: default_database_url(),
            max_connections: default_pool_size(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://construction_stages.db".to_string()
}

fn default_pool_size() -> u32 {
    5
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Whether logging is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in each event.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingSection {
    /// Converts to the logging crate's configuration.
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            file_line_info: self.include_location,
            ..base
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resource behaviour section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StagesSection {
    /// Whether `PATCH` with `status: DELETED` soft-deletes the stage. When
    /// false such a patch is rejected as a validation error.
    #[serde(default = "default_true")]
    pub allow_delete_via_update: bool,
}

impl Default for StagesSection {
    fn default() -> Self {
        Self {
            allow_delete_via_update: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let section = ServerSection::default();
        assert_eq!(section.http_addr, "127.0.0.1:8000");
        assert_eq!(section.request_timeout_ms, 30_000);
        assert_eq!(section.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let section: DatabaseSection = toml::from_str(r#"backend = "memory""#).unwrap();
        assert_eq!(section.backend, StorageBackend::Memory);
        assert_eq!(section.url, "sqlite://construction_stages.db");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<StagesSection, _> = toml::from_str("allow_hard_delete = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_to_log_config() {
        let section = LoggingSection {
            enabled: true,
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
        };
        let config = section.to_log_config();
        assert!(!config.json_format);
        assert_eq!(config.level, "debug");
        assert!(!config.file_line_info);

        let config = LoggingSection::default().to_log_config();
        assert!(config.json_format);
    }
}
