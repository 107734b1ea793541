//! # Stages Test
//!
//! In-memory HTTP testing for the construction stages API. Requests are fed
//! straight into [`App::handle`](stages_server::App::handle), so tests cover
//! routing, body parsing, validation, envelopes and headers without binding a
//! port.
//!
//! ## Example
//!
//! ```rust
//! use http::StatusCode;
//! use serde_json::json;
//! use stages_test::TestClient;
//!
//! # async fn demo() {
//! let client = TestClient::memory();
//!
//! let response = client
//!     .post("/constructionStages")
//!     .json(&json!({"name": "Foundation", "startDate": "2024-01-01T00:00:00Z"}))
//!     .send()
//!     .await;
//! response.assert_status(StatusCode::CREATED);
//!
//! client
//!     .get("/constructionStages/42")
//!     .send()
//!     .await
//!     .assert_error(StatusCode::NOT_FOUND, "Construction stage not found");
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/stages-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestRequest};
pub use error::TestError;
pub use response::TestResponse;
