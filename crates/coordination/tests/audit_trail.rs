use herdbook_coordination::AuditTrail;
use herdbook_core::audit::{Actor, AuditAction};
use herdbook_core::entities::EntityKind;
use herdbook_db::models::audit::AuditQuery;
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn query_items_and_total_agree_under_a_filter(pool: SqlitePool) {
    for i in 0..3 {
        AuditTrail::record(
            &pool,
            EntityKind::Weighing,
            1,
            AuditAction::Update,
            Some(&json!({"weight_kg": i})),
            Some(&json!({"weight_kg": i + 1})),
            &Actor::user("device-a", Some("Alice")),
            None,
        )
        .await;
    }
    AuditTrail::record(
        &pool,
        EntityKind::Farm,
        1,
        AuditAction::Create,
        None,
        Some(&json!({"name": "Las Rosas"})),
        &Actor::system(),
        None,
    )
    .await;

    // total counts every match; items honor the page size.
    let page = AuditTrail::query(
        &pool,
        &AuditQuery {
            entity_type: Some("weighing".to_string()),
            limit: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].seq, 3);
    assert!(page.items.iter().all(|e| e.entity_type == "weighing"));

    let everything = AuditTrail::query(&pool, &AuditQuery::default())
        .await
        .unwrap();
    assert_eq!(everything.total, 4);
    assert_eq!(everything.items.len(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn record_redacts_sensitive_snapshot_fields(pool: SqlitePool) {
    AuditTrail::record(
        &pool,
        EntityKind::User,
        1,
        AuditAction::Update,
        Some(&json!({"username": "alice", "password_hash": "old"})),
        Some(&json!({"username": "alice", "password_hash": "new"})),
        &Actor::system(),
        None,
    )
    .await;

    let trail = AuditTrail::history(&pool, EntityKind::User, 1).await.unwrap();
    assert_eq!(trail.len(), 1);
    let event = &trail[0];
    assert_eq!(event.before_json.as_ref().unwrap()["password_hash"], "[REDACTED]");
    assert_eq!(event.after_json.as_ref().unwrap()["password_hash"], "[REDACTED]");
    assert_eq!(event.after_json.as_ref().unwrap()["username"], "alice");
    // System-generated events carry no actor identity.
    assert!(event.actor_id.is_none());
}
