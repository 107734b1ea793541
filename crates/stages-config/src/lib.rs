//! Typed configuration for the construction stages service.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`STAGES__SECTION__KEY`)
//! - Strict parsing (unknown keys are errors)
//! - Layered loading (defaults → file → env)
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "127.0.0.1:8000"
//! request_timeout_ms = 30000
//! shutdown_timeout_secs = 30
//!
//! [database]
//! backend = "sqlite"          # or "memory"
//! url = "sqlite://construction_stages.db"
//! max_connections = 5
//!
//! [logging]
//! level = "info"
//! format = "json"             # or "pretty"
//!
//! [stages]
//! allow_delete_via_update = true
//! ```

#![doc(html_root_url = "https://docs.rs/stages-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::StagesConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    DatabaseSection, LogFormat, LoggingSection, ServerSection, StagesSection, StorageBackend,
};
