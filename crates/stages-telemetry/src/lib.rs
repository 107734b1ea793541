//! Logging setup for the construction stages service.
//!
//! Wraps `tracing-subscriber` with an [`EnvFilter`](tracing_subscriber::EnvFilter)
//! and either a JSON or a pretty formatter, and defines the field names and
//! request log macros the server uses.

#![doc(html_root_url = "https://docs.rs/stages-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type alias for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
