//! The construction stage resource handler.
//!
//! Each operation runs start to finish against the injected store:
//! fetch the existing record (update/delete), validate, persist, re-fetch.
//! Validation failures never reach the store.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use stages_core::{
    ApiError, ApiResult, ConstructionStage, CreateRequest, SuccessEnvelope, UpdateRequest,
};
use stages_store::{StageStore, StoreError};

/// Message returned by a successful delete.
pub const DELETED_MESSAGE: &str = "Construction stage deleted successfully";

/// Validation message when delete-via-update is disabled.
pub const DELETE_VIA_UPDATE_REJECTED: &str =
    "Status DELETED cannot be set via update, use DELETE instead";

/// Handler behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Whether `PATCH {"status":"DELETED"}` soft-deletes the record.
    /// When `false` such a patch fails validation.
    pub allow_delete_via_update: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            allow_delete_via_update: true,
        }
    }
}

/// Result of an update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The record after the update (or unchanged, for an empty patch).
    Updated(ConstructionStage),
    /// The patch set status to `DELETED`.
    Deleted(SuccessEnvelope),
}

/// Implements list/get/create/update/delete on top of a [`StageStore`].
#[derive(Clone)]
pub struct StageHandler {
    store: Arc<dyn StageStore>,
    config: HandlerConfig,
}

impl std::fmt::Debug for StageHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageHandler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn store_failure(action: &'static str) -> impl FnOnce(StoreError) -> ApiError {
    move |source| ApiError::persistence(action, source)
}

impl StageHandler {
    /// Creates a handler over `store`.
    pub fn new(store: Arc<dyn StageStore>, config: HandlerConfig) -> Self {
        Self { store, config }
    }

    /// The behaviour switches in effect.
    pub fn config(&self) -> HandlerConfig {
        self.config
    }

    /// Checks the store is reachable.
    pub async fn ping(&self) -> ApiResult<()> {
        self.store
            .ping()
            .await
            .map_err(store_failure("Storage is unavailable"))
    }

    /// All non-deleted stages, newest start first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResult<Vec<ConstructionStage>> {
        let stages = self
            .store
            .list_active()
            .await
            .map_err(store_failure("Failed to load construction stages"))?;
        debug!(count = stages.len(), "Listed construction stages");
        Ok(stages)
    }

    /// One non-deleted stage.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> ApiResult<ConstructionStage> {
        self.fetch(id).await
    }

    /// Validates and stores a new stage, returning the stored record.
    #[instrument(skip(self, body))]
    pub async fn create(&self, body: &Value) -> ApiResult<ConstructionStage> {
        let request = CreateRequest::from_json(body)?;
        let stage = request.validate().map_err(ApiError::validation)?;

        let id = self
            .store
            .insert(&stage)
            .await
            .map_err(store_failure("Failed to create construction stage"))?;
        info!(stage_id = id, "Created construction stage");

        self.store
            .find_active(id)
            .await
            .map_err(store_failure("Failed to load construction stage"))?
            .ok_or_else(|| {
                ApiError::persistence(
                    "Failed to load construction stage",
                    anyhow::anyhow!("stage {id} missing right after insert"),
                )
            })
    }

    /// Applies a partial update.
    #[instrument(skip(self, body))]
    pub async fn update(&self, id: i64, body: &Value) -> ApiResult<UpdateOutcome> {
        let request = UpdateRequest::from_json(body)?;
        let existing = self.fetch(id).await?;

        let patch = request.validate(&existing).map_err(ApiError::validation)?;
        if patch.is_empty() {
            debug!(stage_id = id, "Empty patch, nothing to update");
            return Ok(UpdateOutcome::Updated(existing));
        }

        if patch.requests_delete() {
            if !self.config.allow_delete_via_update {
                return Err(ApiError::validation(vec![
                    DELETE_VIA_UPDATE_REJECTED.to_string()
                ]));
            }
            // Same as DELETE: every other field in the patch is discarded.
            let deleted = self
                .store
                .mark_deleted(id)
                .await
                .map_err(store_failure("Failed to delete construction stage"))?;
            if !deleted {
                return Err(ApiError::stage_not_found());
            }
            info!(stage_id = id, "Deleted construction stage via update");
            return Ok(UpdateOutcome::Deleted(SuccessEnvelope::ok(DELETED_MESSAGE)));
        }

        let updated = self
            .store
            .update(id, &patch)
            .await
            .map_err(store_failure("Failed to update construction stage"))?;
        if !updated {
            return Err(ApiError::stage_not_found());
        }

        info!(stage_id = id, "Updated construction stage");
        self.fetch(id).await.map(UpdateOutcome::Updated)
    }

    /// Soft-deletes a stage. A second delete of the same id is `NotFound`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> ApiResult<SuccessEnvelope> {
        self.fetch(id).await?;

        let deleted = self
            .store
            .mark_deleted(id)
            .await
            .map_err(store_failure("Failed to delete construction stage"))?;
        if !deleted {
            return Err(ApiError::stage_not_found());
        }

        info!(stage_id = id, "Deleted construction stage");
        Ok(SuccessEnvelope::ok(DELETED_MESSAGE))
    }

    async fn fetch(&self, id: i64) -> ApiResult<ConstructionStage> {
        self.store
            .find_active(id)
            .await
            .map_err(store_failure("Failed to load construction stage"))?
            .ok_or_else(ApiError::stage_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stages_core::{DurationUnit, StageStatus};
    use stages_store::MemoryStore;

    fn handler() -> (StageHandler, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let handler = StageHandler::new(store.clone(), HandlerConfig::default());
        (handler, store)
    }

    fn foundation() -> Value {
        json!({
            "name": "Foundation",
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": "2024-01-08T00:00:00Z",
            "durationUnit": "DAYS"
        })
    }

    #[tokio::test]
    async fn test_create_computes_duration() {
        let (handler, _) = handler();
        let stage = handler.create(&foundation()).await.unwrap();

        assert_eq!(stage.id, 1);
        assert_eq!(stage.name, "Foundation");
        assert_eq!(stage.duration, Some(7.0));
        assert_eq!(stage.status, StageStatus::New);
    }

    #[tokio::test]
    async fn test_create_invalid_not_persisted() {
        let (handler, store) = handler();
        let err = handler
            .create(&json!({"name": "", "startDate": "2024-01-01T00:00:00Z"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Validation { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_create_non_object_is_malformed() {
        let (handler, _) = handler();
        let err = handler.create(&json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedRequest { .. }));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let (handler, _) = handler();
        let err = handler.get(99).await.unwrap_err();
        assert_eq!(err.to_string(), "Construction stage not found");
    }

    #[tokio::test]
    async fn test_update_partial() {
        let (handler, _) = handler();
        let created = handler.create(&foundation()).await.unwrap();

        let outcome = handler
            .update(created.id, &json!({"durationUnit": "WEEKS", "color": "#00FF00"}))
            .await
            .unwrap();
        let UpdateOutcome::Updated(stage) = outcome else {
            panic!("expected an updated stage");
        };

        assert_eq!(stage.name, "Foundation");
        assert_eq!(stage.end_date, created.end_date);
        assert_eq!(stage.duration_unit, DurationUnit::Weeks);
        assert_eq!(stage.duration, Some(1.0));
        assert_eq!(stage.color.as_deref(), Some("#00FF00"));
    }

    #[tokio::test]
    async fn test_update_empty_patch_is_noop() {
        let (handler, _) = handler();
        let created = handler.create(&foundation()).await.unwrap();

        let outcome = handler
            .update(created.id, &json!({"unknown": 1, "duration": 99}))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated(created));
    }

    #[tokio::test]
    async fn test_update_missing_stage() {
        let (handler, _) = handler();
        let err = handler.update(5, &json!({"name": "X"})).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_validation_against_merged_state() {
        let (handler, _) = handler();
        let created = handler.create(&foundation()).await.unwrap();

        let err = handler
            .update(created.id, &json!({"startDate": "2024-02-01T00:00:00Z"}))
            .await
            .unwrap_err();
        let ApiError::Validation { errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors, vec!["End date must be after start date"]);
    }

    #[tokio::test]
    async fn test_update_to_deleted_soft_deletes() {
        let (handler, store) = handler();
        let created = handler.create(&foundation()).await.unwrap();

        let outcome = handler
            .update(created.id, &json!({"status": "DELETED"}))
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Deleted(_)));
        assert!(handler.get(created.id).await.is_err());
        assert_eq!(
            store.get_raw(created.id).map(|s| s.status),
            Some(StageStatus::Deleted)
        );
    }

    #[tokio::test]
    async fn test_update_to_deleted_leaves_other_fields() {
        let (handler, store) = handler();
        let created = handler.create(&foundation()).await.unwrap();

        let outcome = handler
            .update(
                created.id,
                &json!({
                    "name": "Renamed",
                    "color": "#00F",
                    "endDate": "2024-02-01T00:00:00Z",
                    "status": "DELETED"
                }),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, UpdateOutcome::Deleted(_)));

        let raw = store.get_raw(created.id).unwrap();
        assert_eq!(raw.status, StageStatus::Deleted);
        assert_eq!(raw.name, "Foundation");
        assert_eq!(raw.color, None);
        assert_eq!(raw.end_date, created.end_date);
        assert_eq!(raw.duration, Some(7.0));
    }

    #[tokio::test]
    async fn test_update_to_deleted_rejected_when_disabled() {
        let store = Arc::new(MemoryStore::new());
        let handler = StageHandler::new(
            store,
            HandlerConfig {
                allow_delete_via_update: false,
            },
        );
        let created = handler.create(&foundation()).await.unwrap();

        let err = handler
            .update(created.id, &json!({"status": "DELETED"}))
            .await
            .unwrap_err();
        let ApiError::Validation { errors, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors, vec![DELETE_VIA_UPDATE_REJECTED]);
        assert!(handler.get(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_then_get_not_found() {
        let (handler, store) = handler();
        let created = handler.create(&foundation()).await.unwrap();

        let envelope = handler.delete(created.id).await.unwrap();
        assert_eq!(envelope.success.code, 200);
        assert_eq!(envelope.success.message, DELETED_MESSAGE);

        assert!(matches!(
            handler.get(created.id).await,
            Err(ApiError::NotFound { .. })
        ));
        assert!(matches!(
            handler.delete(created.id).await,
            Err(ApiError::NotFound { .. })
        ));

        let raw = store.get_raw(created.id).unwrap();
        assert_eq!(raw.status, StageStatus::Deleted);
        assert_eq!(raw.name, "Foundation");
    }

    #[tokio::test]
    async fn test_list_excludes_deleted() {
        let (handler, _) = handler();
        let a = handler.create(&foundation()).await.unwrap();
        let b = handler
            .create(&json!({"name": "Framing", "startDate": "2024-03-01T00:00:00Z"}))
            .await
            .unwrap();
        handler.delete(a.id).await.unwrap();

        let stages = handler.list().await.unwrap();
        assert_eq!(stages, vec![b]);
    }

    #[tokio::test]
    async fn test_ping() {
        let (handler, _) = handler();
        assert!(handler.ping().await.is_ok());
    }
}
