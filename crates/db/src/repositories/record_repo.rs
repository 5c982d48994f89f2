//! Repository for the `records` table.
//!
//! Implements the abstract record-store surface the coordination layer
//! consumes: get-by-id, partial field merge, and full-table scan, all keyed
//! by [`EntityKind`].

use chrono::Utc;
use herdbook_core::entities::EntityKind;
use herdbook_core::types::{DbId, Timestamp};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::models::record::{CreateRecord, StoredRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, entity_type, data, remote_id, is_synced, created_at, updated_at";

/// Provides CRUD operations for stored records.
pub struct RecordRepo;

impl RecordRepo {
    /// Insert a new record, returning the created row.
    pub async fn create(
        pool: &SqlitePool,
        kind: EntityKind,
        input: &CreateRecord,
    ) -> Result<StoredRecord, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO records (entity_type, data, remote_id, is_synced, created_at, updated_at)
             VALUES (?, ?, ?, 0, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredRecord>(&query)
            .bind(kind.as_str())
            .bind(&input.data)
            .bind(&input.remote_id)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find a record by kind and id.
    pub async fn find_by_id(
        pool: &SqlitePool,
        kind: EntityKind,
        id: DbId,
    ) -> Result<Option<StoredRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM records WHERE entity_type = ? AND id = ?");
        sqlx::query_as::<_, StoredRecord>(&query)
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Full-table scan of one entity kind, most recently updated first.
    pub async fn list(
        pool: &SqlitePool,
        kind: EntityKind,
    ) -> Result<Vec<StoredRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM records WHERE entity_type = ? ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, StoredRecord>(&query)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await
    }

    /// Apply a partial field merge to a record's business data.
    ///
    /// Keys present in `patch` overwrite (or add to) the stored `data`
    /// object; other fields are untouched. Bumps `updated_at` to `now` and
    /// clears `is_synced`, since every local mutation has to be pushed to
    /// the backend again. Returns `None` if no such record exists.
    pub async fn merge_update(
        pool: &SqlitePool,
        kind: EntityKind,
        id: DbId,
        patch: &Value,
        now: Timestamp,
    ) -> Result<Option<StoredRecord>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM records WHERE entity_type = ? AND id = ?");
        let Some(current) = sqlx::query_as::<_, StoredRecord>(&select)
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut data = match current.data {
            Value::Object(fields) => fields,
            _ => serde_json::Map::new(),
        };
        if let Value::Object(fields) = patch {
            for (key, value) in fields {
                data.insert(key.clone(), value.clone());
            }
        }

        let update = format!(
            "UPDATE records SET data = ?, is_synced = 0, updated_at = ?
             WHERE entity_type = ? AND id = ?
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, StoredRecord>(&update)
            .bind(Value::Object(data))
            .bind(now)
            .bind(kind.as_str())
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Record a successful backend push: stores the remote id mirror and
    /// sets the synced flag.
    pub async fn mark_synced(
        pool: &SqlitePool,
        kind: EntityKind,
        id: DbId,
        remote_id: &str,
    ) -> Result<Option<StoredRecord>, sqlx::Error> {
        let query = format!(
            "UPDATE records SET remote_id = ?, is_synced = 1
             WHERE entity_type = ? AND id = ?
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoredRecord>(&query)
            .bind(remote_id)
            .bind(kind.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a record. Its audit history is intentionally left in place.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(
        pool: &SqlitePool,
        kind: EntityKind,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM records WHERE entity_type = ? AND id = ?")
            .bind(kind.as_str())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
