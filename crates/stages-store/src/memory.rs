//! In-memory store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use stages_core::{ConstructionStage, NewStage, StagePatch, StageStatus};

use crate::{list_order, StageStore, StoreResult};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    rows: BTreeMap<i64, ConstructionStage>,
}

/// A [`StageStore`] backed by a map behind a read-write lock.
///
/// Ids start at 1 and are never reused, matching an autoincrement column.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, soft-deleted ones included.
    pub fn len(&self) -> usize {
        self.state.read().rows.len()
    }

    /// True when nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.state.read().rows.is_empty()
    }

    /// Returns a stored row regardless of its status.
    pub fn get_raw(&self, id: i64) -> Option<ConstructionStage> {
        self.state.read().rows.get(&id).cloned()
    }
}

#[async_trait]
impl StageStore for MemoryStore {
    async fn list_active(&self) -> StoreResult<Vec<ConstructionStage>> {
        let mut stages: Vec<_> = self
            .state
            .read()
            .rows
            .values()
            .filter(|s| !s.is_deleted())
            .cloned()
            .collect();
        stages.sort_by(list_order);
        Ok(stages)
    }

    async fn find_active(&self, id: i64) -> StoreResult<Option<ConstructionStage>> {
        Ok(self
            .state
            .read()
            .rows
            .get(&id)
            .filter(|s| !s.is_deleted())
            .cloned())
    }

    async fn insert(&self, stage: &NewStage) -> StoreResult<i64> {
        let mut state = self.state.write();
        state.last_id += 1;
        let id = state.last_id;
        state.rows.insert(id, stage.clone().into_stage(id));
        Ok(id)
    }

    async fn update(&self, id: i64, patch: &StagePatch) -> StoreResult<bool> {
        let mut state = self.state.write();
        match state.rows.get_mut(&id).filter(|s| !s.is_deleted()) {
            Some(stage) => {
                stage.apply(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_deleted(&self, id: i64) -> StoreResult<bool> {
        let mut state = self.state.write();
        match state.rows.get_mut(&id).filter(|s| !s.is_deleted()) {
            Some(stage) => {
                stage.status = StageStatus::Deleted;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
