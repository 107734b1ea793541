//! Root configuration type.

use serde::{Deserialize, Serialize};

use crate::schema::{
    DatabaseSection, LogFormat, LoggingSection, ServerSection, StagesSection, StorageBackend,
};
use crate::ConfigError;

/// Complete service configuration.
///
/// # Example
///
/// ```
/// use stages_config::StagesConfig;
///
/// let config = StagesConfig::default();
/// assert!(config.validate().is_ok());
/// assert!(config.stages.allow_delete_via_update);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StagesConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Storage settings.
    #[serde(default)]
    pub database: DatabaseSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Resource behaviour.
    #[serde(default)]
    pub stages: StagesSection,
}

impl StagesConfig {
    /// Local development: in-memory store, pretty debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            database: DatabaseSection {
                backend: StorageBackend::Memory,
                ..DatabaseSection::default()
            },
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                include_location: true,
                ..LoggingSection::default()
            },
            ..Self::default()
        }
    }

    /// Production: SQLite store, JSON logs, listening on all interfaces.
    #[must_use]
    pub fn production() -> Self {
        Self {
            server: ServerSection {
                http_addr: "0.0.0.0:8000".to_string(),
                ..ServerSection::default()
            },
            ..Self::default()
        }
    }

    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::invalid(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.server.max_connections == 0 {
            return Err(ConfigError::invalid(
                "server.max_connections",
                "must be greater than zero",
            ));
        }

        if self.database.backend == StorageBackend::Sqlite {
            if !self.database.url.starts_with("sqlite:") {
                return Err(ConfigError::invalid(
                    "database.url",
                    format!("expected a sqlite: URL, got '{}'", self.database.url),
                ));
            }
            if self.database.max_connections == 0 {
                return Err(ConfigError::invalid(
                    "database.max_connections",
                    "must be greater than zero",
                ));
            }
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level", "must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(StagesConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        let dev = StagesConfig::development();
        assert!(dev.validate().is_ok());
        assert_eq!(dev.database.backend, StorageBackend::Memory);
        assert_eq!(dev.logging.format, LogFormat::Pretty);

        let prod = StagesConfig::production();
        assert!(prod.validate().is_ok());
        assert_eq!(prod.server.http_addr, "0.0.0.0:8000");
        assert_eq!(prod.database.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn test_invalid_addr() {
        let mut config = StagesConfig::default();
        config.server.http_addr = "localhost".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { ref field, .. }) if field == "server.http_addr"
        ));
    }

    #[test]
    fn test_invalid_database_url() {
        let mut config = StagesConfig::default();
        config.database.url = "postgres://localhost/stages".to_string();
        assert!(config.validate().is_err());

        config.database.backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = StagesConfig::default();
        config.server.request_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<StagesConfig, _> = toml::from_str("[metrics]\nenabled = true");
        assert!(result.is_err());
    }
}
