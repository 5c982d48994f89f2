//! Repository for the `record_locks` table.
//!
//! Acquisition is a single atomic conditional upsert against the unique
//! `(entity_type, entity_id)` index: there is no separate check step, so two
//! actors can never both observe "unlocked" and both write themselves in.

use chrono::Duration;
use herdbook_core::entities::EntityKind;
use herdbook_core::types::{DbId, Timestamp};
use sqlx::SqlitePool;

use crate::models::lock::RecordLock;

/// Column list for `record_locks` queries.
const COLUMNS: &str =
    "id, entity_type, entity_id, actor_id, actor_label, acquired_at, expires_at";

/// Provides lease operations for record locks.
pub struct LockRepo;

impl LockRepo {
    /// Attempt to acquire (or renew) the lease on a record.
    ///
    /// A single upsert covers all three grant cases:
    /// - no lock row exists: insert a fresh lease;
    /// - the existing holder is `actor_id`: renew, advancing both
    ///   `acquired_at` and `expires_at`;
    /// - the existing lease has expired: take it over.
    ///
    /// Returns the granted lease, or `None` when another actor holds a live
    /// lease (contention). Never mutates a live lease owned by someone else.
    pub async fn acquire(
        pool: &SqlitePool,
        kind: EntityKind,
        entity_id: DbId,
        actor_id: &str,
        actor_label: Option<&str>,
        now: Timestamp,
        ttl: Duration,
    ) -> Result<Option<RecordLock>, sqlx::Error> {
        let expires_at = now + ttl;
        let query = format!(
            "INSERT INTO record_locks (entity_type, entity_id, actor_id, actor_label, acquired_at, expires_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (entity_type, entity_id) DO UPDATE SET
                 actor_id = excluded.actor_id,
                 actor_label = excluded.actor_label,
                 acquired_at = excluded.acquired_at,
                 expires_at = excluded.expires_at
             WHERE record_locks.actor_id = excluded.actor_id
                OR record_locks.expires_at <= excluded.acquired_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RecordLock>(&query)
            .bind(kind.as_str())
            .bind(entity_id)
            .bind(actor_id)
            .bind(actor_label)
            .bind(now)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }

    /// Get the raw lock row for a record, expired or not.
    pub async fn get(
        pool: &SqlitePool,
        kind: EntityKind,
        entity_id: DbId,
    ) -> Result<Option<RecordLock>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM record_locks WHERE entity_type = ? AND entity_id = ?");
        sqlx::query_as::<_, RecordLock>(&query)
            .bind(kind.as_str())
            .bind(entity_id)
            .fetch_optional(pool)
            .await
    }

    /// Unconditionally release the lease on a record, regardless of holder.
    ///
    /// Returns `true` if a lock row was removed.
    pub async fn release(
        pool: &SqlitePool,
        kind: EntityKind,
        entity_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM record_locks WHERE entity_type = ? AND entity_id = ?")
            .bind(kind.as_str())
            .bind(entity_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Clear the lease on one record only if it has expired (self-healing
    /// read path). Returns `true` if a stale row was removed.
    pub async fn release_if_expired(
        pool: &SqlitePool,
        kind: EntityKind,
        entity_id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM record_locks
             WHERE entity_type = ? AND entity_id = ? AND expires_at <= ?",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Release every expired lease across all entity kinds.
    ///
    /// Returns the number of leases released. Idempotent.
    pub async fn release_expired(pool: &SqlitePool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM record_locks WHERE expires_at <= ?")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
