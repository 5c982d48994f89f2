//! Audit event models and DTOs.
//!
//! Audit events are immutable once created (no `updated_at`) and are never
//! deleted by normal operation: the version history of a record outlives the
//! record itself.

use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Audit event entity
// ---------------------------------------------------------------------------

/// A single entry in a record's append-only version history.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEvent {
    pub id: DbId,
    pub entity_type: String,
    pub entity_id: DbId,
    /// Per-entity monotonically increasing sequence number; a hole in the
    /// sequence reveals a lost append.
    pub seq: i64,
    pub action: String,
    pub actor_id: Option<String>,
    pub actor_label: Option<String>,
    /// Full-record snapshot before the mutation; `None` for `create`.
    pub before_json: Option<Value>,
    /// Full-record snapshot after the mutation; `None` for `delete`.
    pub after_json: Option<Value>,
    pub description: Option<String>,
    pub recorded_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for appending a new audit event. `seq` and `recorded_at` are assigned
/// by the repository.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuditEvent {
    pub entity_type: String,
    pub entity_id: DbId,
    pub action: String,
    pub actor_id: Option<String>,
    pub actor_label: Option<String>,
    pub before_json: Option<Value>,
    pub after_json: Option<Value>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for querying audit events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub action: Option<String>,
    pub actor_id: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated response for audit event queries.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEventPage {
    pub items: Vec<AuditEvent>,
    pub total: i64,
}
