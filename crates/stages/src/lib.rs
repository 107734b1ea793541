//! # Stages
//!
//! A REST service managing construction stages: named, dated phases of a
//! construction project with a derived duration, a display color and a
//! soft-delete lifecycle.
//!
//! This facade re-exports the workspace crates and provides the
//! [`bootstrap`] helpers used by the `stages` binary:
//!
//! - [`core`]: model, validation, duration calculation, payloads, errors
//! - [`router`]: ordered pattern router with typed placeholders
//! - [`store`]: persistence trait with memory and SQLite implementations
//! - [`server`]: route table, resource handler, dispatcher, HTTP server
//! - [`config`]: layered configuration
//! - [`docs`]: OpenAPI and Markdown reference generation
//!
//! ## Example
//!
//! ```rust,no_run
//! use stages::bootstrap;
//! use stages::config::ConfigLoader;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ConfigLoader::new().with_defaults().load()?;
//! let server = bootstrap::build_server(&config).await?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/stages/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod bootstrap;

pub use stages_config as config;
pub use stages_core as core;
pub use stages_docs as docs;
pub use stages_router as router;
pub use stages_server as server;
pub use stages_store as store;
pub use stages_telemetry as telemetry;

pub use bootstrap::BootstrapError;
pub use stages_core::{ApiError, ConstructionStage, DurationUnit, StageStatus};
pub use stages_server::{App, Server, StageHandler};

/// Version of the service.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
