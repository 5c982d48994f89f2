//! The append-only audit trail.
//!
//! Appending is fire-and-forget: audit bookkeeping must never abort a
//! business write that already succeeded, so failures are logged and
//! swallowed. Reads propagate errors normally.

use herdbook_core::audit::{redact_sensitive_fields, Actor, AuditAction};
use herdbook_core::entities::EntityKind;
use herdbook_core::types::DbId;
use herdbook_db::models::audit::{AuditEvent, AuditEventPage, AuditQuery, CreateAuditEvent};
use herdbook_db::repositories::AuditRepo;
use herdbook_db::DbPool;
use serde_json::Value;

/// Append and query operations over a record's version history.
pub struct AuditTrail;

impl AuditTrail {
    /// Append one audit event. Best-effort: any failure is logged, never
    /// propagated. Snapshots are redacted before storage.
    pub async fn record(
        pool: &DbPool,
        kind: EntityKind,
        entity_id: DbId,
        action: AuditAction,
        before: Option<&Value>,
        after: Option<&Value>,
        actor: &Actor,
        description: Option<&str>,
    ) {
        let input = CreateAuditEvent {
            entity_type: kind.as_str().to_string(),
            entity_id,
            action: action.as_str().to_string(),
            actor_id: actor.id.clone(),
            actor_label: actor.label.clone(),
            before_json: before.map(redact_sensitive_fields),
            after_json: after.map(redact_sensitive_fields),
            description: description.map(str::to_string),
        };

        if let Err(e) = AuditRepo::insert(pool, &input).await {
            tracing::error!(
                error = %e,
                entity_type = %kind,
                entity_id,
                action = %action,
                "Failed to append audit event"
            );
        }
    }

    /// The full version chain of one record, most recent first.
    pub async fn history(
        pool: &DbPool,
        kind: EntityKind,
        entity_id: DbId,
    ) -> Result<Vec<AuditEvent>, sqlx::Error> {
        AuditRepo::list_for_entity(pool, kind, entity_id).await
    }

    /// Filtered, paginated query across all entities.
    pub async fn query(pool: &DbPool, params: &AuditQuery) -> Result<AuditEventPage, sqlx::Error> {
        let items = AuditRepo::query(pool, params).await?;
        let total = AuditRepo::count(pool, params).await?;
        Ok(AuditEventPage { items, total })
    }
}
