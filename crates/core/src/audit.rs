//! Audit vocabulary and snapshot helpers.
//!
//! This module lives in `core` (zero internal deps) so the repository layer,
//! the coordination services, and any future export tooling all agree on the
//! action names, the bookkeeping fields excluded from diffs and restores, and
//! the redaction applied to snapshots before storage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The mutation kinds recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Actor identity
// ---------------------------------------------------------------------------

/// Who performed a mutation. The subsystem labels actors, it never
/// authenticates them; system-generated events carry no identity at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Option<String>,
    pub label: Option<String>,
}

impl Actor {
    /// A human actor with an opaque id and an optional display label.
    pub fn user(id: impl Into<String>, label: Option<&str>) -> Self {
        Self {
            id: Some(id.into()),
            label: label.map(str::to_string),
        }
    }

    /// A system-generated event with no actor identity.
    pub fn system() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Bookkeeping fields
// ---------------------------------------------------------------------------

/// Fields maintained by the store rather than entered by a person.
///
/// Excluded from field-level diffs (not meaningful to a reviewer) and
/// stripped before a restore (must never be blindly overwritten from a stale
/// snapshot). The `locked_*` names cover snapshots written by older clients
/// that embedded lease state in the record itself.
pub const BOOKKEEPING_FIELDS: &[&str] = &[
    "id",
    "remote_id",
    "is_synced",
    "created_at",
    "updated_at",
    "locked_by",
    "locked_by_label",
    "locked_at",
];

/// Returns `true` if the field is store bookkeeping rather than business data.
pub fn is_bookkeeping_field(field: &str) -> bool {
    BOOKKEEPING_FIELDS.contains(&field)
}

/// Remove every bookkeeping field from a snapshot object.
///
/// Non-object values are passed through unchanged.
pub fn strip_bookkeeping_fields(snapshot: &Value) -> Value {
    match snapshot {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !is_bookkeeping_field(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Sensitive field redaction
// ---------------------------------------------------------------------------

/// Key fragments whose values are redacted from snapshots before storage.
pub const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "token",
    "secret",
    "api_key",
    "private_key",
    "credential",
];

/// Redact sensitive fields from a JSON value, recursing into objects and
/// arrays. Replaces the value of any key containing a [`SENSITIVE_FIELDS`]
/// fragment with `"[REDACTED]"`.
pub fn redact_sensitive_fields(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in map {
                let lower_key = key.to_lowercase();
                if SENSITIVE_FIELDS.iter().any(|f| lower_key.contains(f)) {
                    redacted.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    redacted.insert(key.clone(), redact_sensitive_fields(val));
                }
            }
            Value::Object(redacted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive_fields).collect()),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
