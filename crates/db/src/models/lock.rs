//! Record lease-lock model.

use herdbook_core::locking;
use herdbook_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `record_locks` table: one advisory lease on one record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecordLock {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    pub actor_id: String,
    /// Display-only; never used for correctness.
    pub actor_label: Option<String>,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
}

impl RecordLock {
    /// Expiry is authoritative over row presence.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        locking::is_expired(self.expires_at, now)
    }
}
