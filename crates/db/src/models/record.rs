//! Stored record model and DTOs.

use herdbook_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `records` table. Business fields live in `data`; the
/// remaining columns are store bookkeeping.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoredRecord {
    pub id: DbId,
    pub entity_type: String,
    pub data: Value,
    pub remote_id: Option<String>,
    pub is_synced: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StoredRecord {
    /// The record as a flat snapshot object: business fields plus the
    /// bookkeeping keys, as stored inside audit events.
    pub fn snapshot(&self) -> Value {
        let mut map = match &self.data {
            Value::Object(fields) => fields.clone(),
            _ => serde_json::Map::new(),
        };
        map.insert("id".into(), serde_json::json!(self.id));
        map.insert("remote_id".into(), serde_json::json!(self.remote_id));
        map.insert("is_synced".into(), serde_json::json!(self.is_synced));
        map.insert("created_at".into(), serde_json::json!(self.created_at));
        map.insert("updated_at".into(), serde_json::json!(self.updated_at));
        Value::Object(map)
    }
}

/// DTO for inserting a new record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecord {
    /// Business fields as a JSON object.
    pub data: Value,
    /// Backend id mirror, when the record originated remotely.
    pub remote_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn snapshot_flattens_data_and_bookkeeping() {
        let now = Utc::now();
        let record = StoredRecord {
            id: 7,
            entity_type: "weighing".into(),
            data: json!({"weight_kg": 310.5, "matriarch_id": 4}),
            remote_id: Some("srv-99".into()),
            is_synced: true,
            created_at: now,
            updated_at: now,
        };

        let snapshot = record.snapshot();
        assert_eq!(snapshot["weight_kg"], json!(310.5));
        assert_eq!(snapshot["id"], json!(7));
        assert_eq!(snapshot["remote_id"], json!("srv-99"));
        assert_eq!(snapshot["is_synced"], json!(true));
    }

    #[test]
    fn snapshot_tolerates_non_object_data() {
        let now = Utc::now();
        let record = StoredRecord {
            id: 1,
            entity_type: "farm".into(),
            data: Value::Null,
            remote_id: None,
            is_synced: false,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(record.snapshot()["id"], serde_json::json!(1));
    }
}
