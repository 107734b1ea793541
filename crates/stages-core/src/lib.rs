//! # Stages Core
//!
//! Domain types and rules for the construction stages API:
//!
//! - [`ConstructionStage`], [`DurationUnit`], [`StageStatus`] - the resource model
//! - [`validate`] - single-field validation rules
//! - [`duration`] - duration derivation
//! - [`CreateRequest`] / [`UpdateRequest`] - payload models turning raw JSON
//!   into a [`NewStage`] or [`StagePatch`]
//! - [`ApiError`] - error taxonomy and wire envelopes
//! - [`RequestContext`] - per-request correlation data

#![doc(html_root_url = "https://docs.rs/stages-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
pub mod duration;
mod error;
mod model;
pub mod payload;
pub mod timestamp;
pub mod validate;

pub use context::{RequestContext, RequestId};
pub use error::{
    ApiError, ApiResult, ErrorCategory, ErrorDetail, ErrorEnvelope, SuccessDetail, SuccessEnvelope,
};
pub use model::{ConstructionStage, DurationUnit, NewStage, StagePatch, StageStatus, UnknownVariant};
pub use payload::{CreateRequest, UpdateRequest};
