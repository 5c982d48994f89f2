use herdbook_core::entities::EntityKind;
use herdbook_db::models::record::CreateRecord;
use herdbook_db::repositories::RecordRepo;
use serde_json::json;
use sqlx::SqlitePool;

fn weighing(data: serde_json::Value) -> CreateRecord {
    CreateRecord {
        data,
        remote_id: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_find_by_id(pool: SqlitePool) {
    let created = RecordRepo::create(
        &pool,
        EntityKind::Weighing,
        &weighing(json!({"matriarch_id": 4, "weight_kg": 310.5})),
    )
    .await
    .unwrap();

    assert_eq!(created.entity_type, "weighing");
    assert!(!created.is_synced);

    let found = RecordRepo::find_by_id(&pool, EntityKind::Weighing, created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.data["weight_kg"], json!(310.5));

    // Kind is part of the key: the same id under another kind is not found.
    let missing = RecordRepo::find_by_id(&pool, EntityKind::Farm, created.id)
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_scans_a_single_kind(pool: SqlitePool) {
    RecordRepo::create(&pool, EntityKind::Weighing, &weighing(json!({"weight_kg": 1})))
        .await
        .unwrap();
    RecordRepo::create(&pool, EntityKind::Weighing, &weighing(json!({"weight_kg": 2})))
        .await
        .unwrap();
    RecordRepo::create(&pool, EntityKind::Farm, &weighing(json!({"name": "Las Rosas"})))
        .await
        .unwrap();

    let weighings = RecordRepo::list(&pool, EntityKind::Weighing).await.unwrap();
    assert_eq!(weighings.len(), 2);

    let farms = RecordRepo::list(&pool, EntityKind::Farm).await.unwrap();
    assert_eq!(farms.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn merge_update_is_a_partial_field_merge(pool: SqlitePool) {
    let created = RecordRepo::create(
        &pool,
        EntityKind::Matriarch,
        &weighing(json!({"name": "Bella", "breed_id": 2})),
    )
    .await
    .unwrap();

    let synced = RecordRepo::mark_synced(&pool, EntityKind::Matriarch, created.id, "srv-11")
        .await
        .unwrap()
        .unwrap();
    assert!(synced.is_synced);

    let updated = RecordRepo::merge_update(
        &pool,
        EntityKind::Matriarch,
        created.id,
        &json!({"breed_id": 3, "notes": "limping"}),
        chrono::Utc::now(),
    )
    .await
    .unwrap()
    .unwrap();

    // Untouched fields survive, patched fields win, sync flag is cleared.
    assert_eq!(updated.data["name"], json!("Bella"));
    assert_eq!(updated.data["breed_id"], json!(3));
    assert_eq!(updated.data["notes"], json!("limping"));
    assert!(!updated.is_synced);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.remote_id.as_deref(), Some("srv-11"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn merge_update_on_missing_record_returns_none(pool: SqlitePool) {
    let result = RecordRepo::merge_update(
        &pool,
        EntityKind::Breed,
        999,
        &json!({"name": "Criollo"}),
        chrono::Utc::now(),
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_the_row_once(pool: SqlitePool) {
    let created = RecordRepo::create(&pool, EntityKind::Vaccination, &weighing(json!({})))
        .await
        .unwrap();

    assert!(RecordRepo::delete(&pool, EntityKind::Vaccination, created.id)
        .await
        .unwrap());
    assert!(RecordRepo::find_by_id(&pool, EntityKind::Vaccination, created.id)
        .await
        .unwrap()
        .is_none());
    assert!(!RecordRepo::delete(&pool, EntityKind::Vaccination, created.id)
        .await
        .unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_succeeds(pool: SqlitePool) {
    herdbook_db::health_check(&pool).await.unwrap();
}
