//! # Stages Store
//!
//! The persistence interface the resource handler depends on, plus two
//! implementations:
//!
//! - [`MemoryStore`] - process-local, used by tests and the `memory` backend
//! - [`SqliteStore`] - `sqlx` SQLite pool
//!
//! Soft-deleted rows stay in storage; every read filters them out.

#![doc(html_root_url = "https://docs.rs/stages-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod memory;
mod sqlite;

use async_trait::async_trait;
use stages_core::{ConstructionStage, NewStage, StagePatch};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Persistence operations the resource handler needs.
///
/// Object-safe via `async_trait` so the handler can hold an
/// `Arc<dyn StageStore>`. Implementations only guarantee per-call atomicity;
/// a read followed by a write from the handler may interleave with other
/// requests.
#[async_trait]
pub trait StageStore: Send + Sync {
    /// All records whose status is not `DELETED`, newest start first, ties
    /// broken by ascending id.
    async fn list_active(&self) -> StoreResult<Vec<ConstructionStage>>;

    /// The record with `id`, unless it is missing or soft-deleted.
    async fn find_active(&self, id: i64) -> StoreResult<Option<ConstructionStage>>;

    /// Inserts a record and returns its new id.
    async fn insert(&self, stage: &NewStage) -> StoreResult<i64>;

    /// Writes the fields present in `patch` to an active record.
    ///
    /// Returns `false` when no active record has `id`.
    async fn update(&self, id: i64, patch: &StagePatch) -> StoreResult<bool>;

    /// Sets status to `DELETED` and leaves every other field alone.
    ///
    /// Returns `false` when no active record has `id`.
    async fn mark_deleted(&self, id: i64) -> StoreResult<bool>;

    /// Checks the store is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

/// Ordering shared by every `list_active` implementation.
pub(crate) fn list_order(a: &ConstructionStage, b: &ConstructionStage) -> std::cmp::Ordering {
    b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id))
}
