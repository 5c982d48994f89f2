//! Repository for the `audit_events` table.
//!
//! Append-only: there are insert and query operations, no update or delete.

use chrono::Utc;
use herdbook_core::entities::EntityKind;
use herdbook_core::types::{DbId, Timestamp};
use sqlx::SqlitePool;

use crate::models::audit::{AuditEvent, AuditQuery, CreateAuditEvent};

/// Column list for `audit_events` SELECT queries.
const COLUMNS: &str = "\
    id, entity_type, entity_id, seq, action, actor_id, actor_label, \
    before_json, after_json, description, recorded_at";

/// Provides append and query operations for audit events.
pub struct AuditRepo;

impl AuditRepo {
    /// Append a new audit event.
    ///
    /// The per-entity `seq` is assigned inside the INSERT (previous maximum
    /// plus one) so the sequence has no gaps under normal operation and a
    /// gap reveals a lost append.
    pub async fn insert(
        pool: &SqlitePool,
        input: &CreateAuditEvent,
    ) -> Result<AuditEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_events
                 (entity_type, entity_id, seq, action, actor_id, actor_label,
                  before_json, after_json, description, recorded_at)
             VALUES (?, ?,
                 (SELECT COALESCE(MAX(seq), 0) + 1 FROM audit_events
                   WHERE entity_type = ? AND entity_id = ?),
                 ?, ?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEvent>(&query)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.entity_type)
            .bind(input.entity_id)
            .bind(&input.action)
            .bind(&input.actor_id)
            .bind(&input.actor_label)
            .bind(&input.before_json)
            .bind(&input.after_json)
            .bind(&input.description)
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Find an audit event by id.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<AuditEvent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM audit_events WHERE id = ?");
        sqlx::query_as::<_, AuditEvent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The full version chain of one record, most recent first.
    pub async fn list_for_entity(
        pool: &SqlitePool,
        kind: EntityKind,
        entity_id: DbId,
    ) -> Result<Vec<AuditEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_events
             WHERE entity_type = ? AND entity_id = ?
             ORDER BY recorded_at DESC, seq DESC"
        );
        sqlx::query_as::<_, AuditEvent>(&query)
            .bind(kind.as_str())
            .bind(entity_id)
            .fetch_all(pool)
            .await
    }

    /// Query audit events with filtering and pagination, most recent first.
    pub async fn query(
        pool: &SqlitePool,
        params: &AuditQuery,
    ) -> Result<Vec<AuditEvent>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).min(500);
        let offset = params.offset.unwrap_or(0);

        let (where_clause, bind_values) = build_audit_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_events {where_clause}
             ORDER BY recorded_at DESC, seq DESC
             LIMIT ? OFFSET ?"
        );

        let q = bind_audit_values(sqlx::query_as::<_, AuditEvent>(&query), &bind_values);
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count audit events matching the given filter (for pagination metadata).
    pub async fn count(pool: &SqlitePool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values) = build_audit_filter(params);

        let query = format!("SELECT COUNT(*) FROM audit_events {where_clause}");

        let q = bind_audit_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }

    /// Highest sequence number recorded for one record, 0 when it has no
    /// history. A trail whose length differs from this value has a gap.
    pub async fn latest_seq(
        pool: &SqlitePool,
        kind: EntityKind,
        entity_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(seq), 0) FROM audit_events
             WHERE entity_type = ? AND entity_id = ?",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .fetch_one(pool)
        .await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built audit queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `AuditQuery` filter parameters.
///
/// The clause is empty if no filters are active, or starts with `WHERE `.
fn build_audit_filter(params: &AuditQuery) -> (String, Vec<BindValue>) {
    let mut conditions: Vec<&'static str> = Vec::new();
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref entity_type) = params.entity_type {
        conditions.push("entity_type = ?");
        bind_values.push(BindValue::Text(entity_type.clone()));
    }

    if let Some(entity_id) = params.entity_id {
        conditions.push("entity_id = ?");
        bind_values.push(BindValue::BigInt(entity_id));
    }

    if let Some(ref action) = params.action {
        conditions.push("action = ?");
        bind_values.push(BindValue::Text(action.clone()));
    }

    if let Some(ref actor_id) = params.actor_id {
        conditions.push("actor_id = ?");
        bind_values.push(BindValue::Text(actor_id.clone()));
    }

    if let Some(from) = params.from {
        conditions.push("recorded_at >= ?");
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push("recorded_at <= ?");
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values)
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_audit_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_audit_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Sqlite, i64, sqlx::sqlite::SqliteArguments<'q>>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Sqlite, i64, sqlx::sqlite::SqliteArguments<'q>> {
    for val in bind_values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
