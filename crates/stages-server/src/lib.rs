//! # Stages Server
//!
//! The HTTP surface of the construction stages API:
//!
//! - [`routes`]: the ordered route table and per-operation metadata
//! - [`StageHandler`]: list/get/create/update/delete over a
//!   [`StageStore`](stages_store::StageStore)
//! - [`App`]: transport-independent dispatch, error envelopes and headers
//! - [`Server`]: hyper HTTP/1.1 server with graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use stages_server::{App, HandlerConfig, Server, ServerConfig, StageHandler};
//! use stages_store::MemoryStore;
//!
//! # async fn run() -> Result<(), stages_server::ServerError> {
//! let handler = StageHandler::new(Arc::new(MemoryStore::new()), HandlerConfig::default());
//! let app = App::new(handler)?;
//!
//! Server::new(ServerConfig::default(), app).run().await
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/stages-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod error;
mod handler;
pub mod routes;
mod server;
mod shutdown;

pub use app::{App, HttpResponse, ResponseBody, API_VERSION, REQUEST_ID_HEADER};
pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use error::ServerError;
pub use handler::{
    HandlerConfig, StageHandler, UpdateOutcome, DELETED_MESSAGE, DELETE_VIA_UPDATE_REJECTED,
};
pub use routes::Operation;
pub use server::Server;
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
