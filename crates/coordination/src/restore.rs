//! Roll a record back to a historical snapshot.
//!
//! Restoring targets an audit event's **before** snapshot: "put the record
//! back the way it was before this change". The restore is applied as a
//! normal update (bookkeeping fields stripped, `updated_at` bumped, synced
//! flag cleared) and is itself recorded as a new audit event — history only
//! ever grows.
//!
//! Unlike audit appends, restore failures are surfaced to the caller: the
//! user explicitly asked for a state change, and masking a failed rollback
//! would leave them believing it happened.

use chrono::Utc;
use herdbook_core::audit::{strip_bookkeeping_fields, Actor, AuditAction};
use herdbook_core::entities::EntityKind;
use herdbook_core::messages::UserMessage;
use herdbook_core::types::{DbId, Timestamp};
use herdbook_db::models::record::StoredRecord;
use herdbook_db::repositories::{AuditRepo, RecordRepo};
use herdbook_db::DbPool;

use crate::history::AuditTrail;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a restore was refused. The record is untouched in every case except
/// a database failure after the merge write itself.
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("Audit event {0} not found")]
    EventNotFound(DbId),

    #[error("Audit event {0} has no before-snapshot to restore")]
    SnapshotMissing(DbId),

    #[error("Snapshot of audit event {0} is not a JSON object")]
    SnapshotCorrupt(DbId),

    #[error("Audit event references unknown entity type '{0}'")]
    UnknownEntityType(String),

    #[error("{0} records cannot be restored automatically; edit the record manually instead")]
    NotRestorable(EntityKind),

    #[error("{kind} record {id} no longer exists")]
    RecordMissing { kind: EntityKind, id: DbId },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RestoreError {
    /// User-facing message for the notification surface.
    pub fn user_message(&self) -> UserMessage {
        UserMessage::error("Restore failed", self.to_string())
    }
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

/// A successfully restored record.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RestoredRecord {
    pub record: StoredRecord,
    /// When the restored version was originally recorded.
    pub restored_from: Timestamp,
}

impl RestoredRecord {
    /// User-facing message for the notification surface.
    pub fn user_message(&self) -> UserMessage {
        UserMessage::info(
            "Record restored",
            format!(
                "Restored the version from {}.",
                self.restored_from.format("%Y-%m-%d %H:%M")
            ),
        )
    }
}

/// Restore a record to the state it had before the given audit event.
///
/// The record's business fields end up equal to the snapshot's; bookkeeping
/// fields (id, timestamps, sync state, remote id) keep their live values.
pub async fn restore_version(
    pool: &DbPool,
    event_id: DbId,
    actor: &Actor,
) -> Result<RestoredRecord, RestoreError> {
    let event = AuditRepo::find_by_id(pool, event_id)
        .await?
        .ok_or(RestoreError::EventNotFound(event_id))?;

    let kind = EntityKind::parse(&event.entity_type)
        .map_err(|_| RestoreError::UnknownEntityType(event.entity_type.clone()))?;
    if !kind.supports_restore() {
        return Err(RestoreError::NotRestorable(kind));
    }

    let snapshot = event
        .before_json
        .as_ref()
        .ok_or(RestoreError::SnapshotMissing(event_id))?;
    if !snapshot.is_object() {
        return Err(RestoreError::SnapshotCorrupt(event_id));
    }

    // Current state becomes the "before" of the restore event.
    let current = RecordRepo::find_by_id(pool, kind, event.entity_id)
        .await?
        .ok_or(RestoreError::RecordMissing {
            kind,
            id: event.entity_id,
        })?;
    let before = current.snapshot();

    let patch = strip_bookkeeping_fields(snapshot);
    let updated = RecordRepo::merge_update(pool, kind, event.entity_id, &patch, Utc::now())
        .await?
        .ok_or(RestoreError::RecordMissing {
            kind,
            id: event.entity_id,
        })?;

    let description = format!("Restored version from {}", event.recorded_at.to_rfc3339());
    AuditTrail::record(
        pool,
        kind,
        event.entity_id,
        AuditAction::Update,
        Some(&before),
        Some(&updated.snapshot()),
        actor,
        Some(&description),
    )
    .await;

    tracing::info!(
        entity_type = %kind,
        entity_id = event.entity_id,
        source_event = event_id,
        "Record restored to historical version"
    );

    Ok(RestoredRecord {
        record: updated,
        restored_from: event.recorded_at,
    })
}
