//! SQLite store built on a `sqlx` pool.
//!
//! Timestamps are stored as `YYYY-MM-DDThh:mm:ssZ` text, so `ORDER BY
//! start_date` is chronological.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use stages_core::{timestamp, ConstructionStage, NewStage, StagePatch};
use tracing::{debug, info};

use crate::{StageStore, StoreError, StoreResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS construction_stages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT,
    duration REAL,
    duration_unit TEXT NOT NULL DEFAULT 'DAYS',
    color TEXT,
    external_id TEXT,
    status TEXT NOT NULL DEFAULT 'NEW'
)";

const SELECT_COLUMNS: &str = "SELECT id, name, start_date, end_date, duration, duration_unit, \
     color, external_id, status FROM construction_stages";

#[derive(Debug, FromRow)]
struct StageRow {
    id: i64,
    name: String,
    start_date: String,
    end_date: Option<String>,
    duration: Option<f64>,
    duration_unit: String,
    color: Option<String>,
    external_id: Option<String>,
    status: String,
}

impl TryFrom<StageRow> for ConstructionStage {
    type Error = StoreError;

    fn try_from(row: StageRow) -> Result<Self, Self::Error> {
        let start_date = timestamp::parse(&row.start_date)
            .ok_or_else(|| StoreError::corrupt("start_date", row.start_date.as_str()))?;
        let end_date = row
            .end_date
            .map(|raw| timestamp::parse(&raw).ok_or_else(|| StoreError::corrupt("end_date", raw)))
            .transpose()?;
        let duration_unit = row
            .duration_unit
            .parse()
            .map_err(|_| StoreError::corrupt("duration_unit", row.duration_unit.as_str()))?;
        let status = row
            .status
            .parse()
            .map_err(|_| StoreError::corrupt("status", row.status.as_str()))?;

        Ok(Self {
            id: row.id,
            name: row.name,
            start_date,
            end_date,
            duration: row.duration,
            duration_unit,
            color: row.color,
            external_id: row.external_id,
            status,
        })
    }
}

/// A [`StageStore`] backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens a pool for `url`, creating the database file if needed.
    ///
    /// In-memory URLs (`sqlite::memory:`) are pinned to a single connection
    /// that is never recycled, since every SQLite connection to `:memory:`
    /// sees its own database.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if url.contains(":memory:") || url.contains("mode=memory") {
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;
        info!(url = %url, "Connected to SQLite");
        Ok(Self { pool })
    }

    /// Wraps an existing pool.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the `construction_stages` table if it does not exist.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        debug!("construction_stages schema ensured");
        Ok(())
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl StageStore for SqliteStore {
    async fn list_active(&self) -> StoreResult<Vec<ConstructionStage>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE status != 'DELETED' ORDER BY start_date DESC, id ASC"
        );
        sqlx::query_as::<_, StageRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(ConstructionStage::try_from)
            .collect()
    }

    async fn find_active(&self, id: i64) -> StoreResult<Option<ConstructionStage>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ? AND status != 'DELETED'");
        sqlx::query_as::<_, StageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ConstructionStage::try_from)
            .transpose()
    }

    async fn insert(&self, stage: &NewStage) -> StoreResult<i64> {
        let result = sqlx::query(
            "INSERT INTO construction_stages \
             (name, start_date, end_date, duration, duration_unit, color, external_id, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&stage.name)
        .bind(timestamp::format(&stage.start_date))
        .bind(stage.end_date.as_ref().map(timestamp::format))
        .bind(stage.duration)
        .bind(stage.duration_unit.as_str())
        .bind(stage.color.as_deref())
        .bind(stage.external_id.as_deref())
        .bind(stage.status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, id: i64, patch: &StagePatch) -> StoreResult<bool> {
        if patch.is_empty() {
            return Ok(self.find_active(id).await?.is_some());
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE construction_stages SET ");
        {
            let mut set = builder.separated(", ");
            if let Some(name) = &patch.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(start) = &patch.start_date {
                set.push("start_date = ").push_bind_unseparated(timestamp::format(start));
            }
            if let Some(end) = &patch.end_date {
                set.push("end_date = ")
                    .push_bind_unseparated(end.as_ref().map(timestamp::format));
            }
            if let Some(duration) = patch.duration {
                set.push("duration = ").push_bind_unseparated(duration);
            }
            if let Some(unit) = patch.duration_unit {
                set.push("duration_unit = ").push_bind_unseparated(unit.as_str());
            }
            if let Some(color) = &patch.color {
                set.push("color = ").push_bind_unseparated(color.clone());
            }
            if let Some(external_id) = &patch.external_id {
                set.push("external_id = ").push_bind_unseparated(external_id.clone());
            }
            if let Some(status) = patch.status {
                set.push("status = ").push_bind_unseparated(status.as_str());
            }
        }
        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND status != 'DELETED'");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_deleted(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE construction_stages SET status = 'DELETED' WHERE id = ? AND status != 'DELETED'",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
