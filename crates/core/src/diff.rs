//! Normalized field-level comparison of record snapshots.
//!
//! Operates on the union of fields across two snapshots, excludes store
//! bookkeeping, and normalizes both sides before the equality test so that
//! cosmetic differences (whitespace, empty-vs-null, equivalent textual date
//! formats) are never reported as changes. Each emitted row carries the raw
//! values for human display; only the equality test uses the normalized form.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit::is_bookkeeping_field;

// ---------------------------------------------------------------------------
// Diff status
// ---------------------------------------------------------------------------

/// The status of a field in a snapshot comparison.
///
/// - `Added`     -- present only in the after side.
/// - `Removed`   -- present only in the before side.
/// - `Changed`   -- present in both sides but with different values.
/// - `Unchanged` -- equal after normalization (never emitted as a row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

impl DiffStatus {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Diff rows
// ---------------------------------------------------------------------------

/// One field whose normalized before/after values differ.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDiff {
    pub field: String,
    /// Raw (non-normalized) value on the before side, `Null` when absent.
    pub before: Value,
    /// Raw (non-normalized) value on the after side, `Null` when absent.
    pub after: Value,
    pub status: DiffStatus,
}

/// Compare two snapshots field by field.
///
/// Non-object snapshots are treated as empty. Rows are emitted in field-name
/// order, one per field whose normalized values differ.
pub fn diff_snapshots(before: &Value, after: &Value) -> Vec<FieldDiff> {
    let empty = serde_json::Map::new();
    let before_map = before.as_object().unwrap_or(&empty);
    let after_map = after.as_object().unwrap_or(&empty);

    let fields: BTreeSet<&String> = before_map.keys().chain(after_map.keys()).collect();

    let mut rows = Vec::new();
    for field in fields {
        if is_bookkeeping_field(field) {
            continue;
        }
        let raw_before = before_map.get(field.as_str()).cloned().unwrap_or(Value::Null);
        let raw_after = after_map.get(field.as_str()).cloned().unwrap_or(Value::Null);
        let status = classify(
            &normalize_value(field, &raw_before),
            &normalize_value(field, &raw_after),
        );
        if status == DiffStatus::Unchanged {
            continue;
        }
        rows.push(FieldDiff {
            field: field.clone(),
            before: raw_before,
            after: raw_after,
            status,
        });
    }
    rows
}

/// Classify a pair of normalized values.
fn classify(before: &Value, after: &Value) -> DiffStatus {
    match (before.is_null(), after.is_null()) {
        (true, true) => DiffStatus::Unchanged,
        (true, false) => DiffStatus::Added,
        (false, true) => DiffStatus::Removed,
        (false, false) => {
            if before == after {
                DiffStatus::Unchanged
            } else {
                DiffStatus::Changed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a value for the equality test.
///
/// Null and empty/whitespace-only strings collapse to `Null`; other strings
/// are trimmed; values recognized as dates (field-name heuristic or literal
/// shape) are re-emitted in a single canonical form. Everything else is
/// compared by deep JSON equality as-is.
pub fn normalize_value(field: &str, value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Value::Null;
            }
            if is_date_field(field) || looks_like_date(trimmed) {
                if let Some(canonical) = canonicalize_date(trimmed) {
                    return Value::String(canonical);
                }
            }
            Value::String(trimmed.to_string())
        }
        other => other.clone(),
    }
}

/// Field-name heuristic for date-bearing fields.
fn is_date_field(field: &str) -> bool {
    field == "date" || field.ends_with("_at") || field.ends_with("_date") || field.ends_with("_on")
}

/// Cheap shape test so obviously date-like literals in arbitrary fields are
/// still canonicalized.
fn looks_like_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() < 8 {
        return false;
    }
    let iso = bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-';
    let slashed = bytes[..2].iter().all(u8::is_ascii_digit) && bytes[2] == b'/';
    iso || slashed
}

/// Parse a textual date across the accepted formats and re-emit it
/// canonically (RFC 3339, UTC; date-only values become midnight UTC).
///
/// Returns `None` for unparseable input, which is then compared as a
/// trimmed opaque string.
fn canonicalize_date(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).to_rfc3339());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive).to_rfc3339());
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(Utc.from_utc_datetime(&midnight).to_rfc3339());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // Identity and exclusions
    // -----------------------------------------------------------------------

    #[test]
    fn identical_snapshots_yield_no_rows() {
        let snapshot = json!({
            "name": "Bella",
            "weight_kg": 310.5,
            "tags": ["pregnant", "ear-tag-12"],
        });
        assert!(diff_snapshots(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn bookkeeping_fields_are_excluded() {
        let before = json!({"id": 1, "updated_at": "2026-01-01T00:00:00Z", "name": "a"});
        let after = json!({"id": 2, "updated_at": "2026-02-01T00:00:00Z", "name": "a"});
        assert!(diff_snapshots(&before, &after).is_empty());
    }

    #[test]
    fn single_changed_field_yields_one_named_row() {
        let before = json!({"name": "Bella", "weight_kg": 300});
        let after = json!({"name": "Bella", "weight_kg": 310});
        let rows = diff_snapshots(&before, &after);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field, "weight_kg");
        assert_eq!(rows[0].status, DiffStatus::Changed);
        assert_eq!(rows[0].before, json!(300));
        assert_eq!(rows[0].after, json!(310));
    }

    // -----------------------------------------------------------------------
    // Added / removed fields
    // -----------------------------------------------------------------------

    #[test]
    fn field_only_in_after_is_added() {
        let rows = diff_snapshots(&json!({}), &json!({"notes": "healthy"}));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field, "notes");
        assert_eq!(rows[0].status, DiffStatus::Added);
        assert_eq!(rows[0].before, Value::Null);
    }

    #[test]
    fn field_only_in_before_is_removed() {
        let rows = diff_snapshots(&json!({"notes": "healthy"}), &json!({}));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DiffStatus::Removed);
        assert_eq!(rows[0].after, Value::Null);
    }

    #[test]
    fn field_added_as_empty_string_is_not_a_change() {
        let rows = diff_snapshots(&json!({}), &json!({"notes": "  "}));
        assert!(rows.is_empty());
    }

    // -----------------------------------------------------------------------
    // String normalization
    // -----------------------------------------------------------------------

    #[test]
    fn whitespace_only_difference_is_not_a_change() {
        let before = json!({"name": "  Bella "});
        let after = json!({"name": "Bella"});
        assert!(diff_snapshots(&before, &after).is_empty());
    }

    #[test]
    fn empty_string_and_null_are_equivalent() {
        let before = json!({"notes": ""});
        let after = json!({"notes": null});
        assert!(diff_snapshots(&before, &after).is_empty());
    }

    #[test]
    fn raw_values_are_preserved_in_rows() {
        let before = json!({"name": " Bella "});
        let after = json!({"name": "Luna"});
        let rows = diff_snapshots(&before, &after);
        assert_eq!(rows[0].before, json!(" Bella "));
        assert_eq!(rows[0].after, json!("Luna"));
    }

    // -----------------------------------------------------------------------
    // Date canonicalization
    // -----------------------------------------------------------------------

    #[test]
    fn equivalent_date_formats_are_not_a_change() {
        let before = json!({"weaning_date": "2026-03-01"});
        let after = json!({"weaning_date": "01/03/2026"});
        assert!(diff_snapshots(&before, &after).is_empty());
    }

    #[test]
    fn equivalent_datetime_formats_are_not_a_change() {
        let before = json!({"weighed_at": "2026-03-01T10:00:00Z"});
        let after = json!({"weighed_at": "2026-03-01 10:00:00"});
        assert!(diff_snapshots(&before, &after).is_empty());
    }

    #[test]
    fn different_calendar_dates_are_a_change() {
        let before = json!({"weaning_date": "2026-03-01"});
        let after = json!({"weaning_date": "2026-03-02"});
        let rows = diff_snapshots(&before, &after);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DiffStatus::Changed);
    }

    #[test]
    fn date_shaped_literal_in_arbitrary_field_is_canonicalized() {
        let before = json!({"note": "2026-03-01T00:00:00+00:00"});
        let after = json!({"note": "2026-03-01"});
        assert!(diff_snapshots(&before, &after).is_empty());
    }

    #[test]
    fn unparseable_dates_compare_as_trimmed_strings() {
        let before = json!({"due_date": "soon "});
        let after = json!({"due_date": "soon"});
        assert!(diff_snapshots(&before, &after).is_empty());

        let rows = diff_snapshots(&json!({"due_date": "soon"}), &json!({"due_date": "later"}));
        assert_eq!(rows.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Structured values
    // -----------------------------------------------------------------------

    #[test]
    fn objects_and_arrays_compare_by_deep_equality() {
        let before = json!({"doses": [{"ml": 2}, {"ml": 3}]});
        let same = json!({"doses": [{"ml": 2}, {"ml": 3}]});
        assert!(diff_snapshots(&before, &same).is_empty());

        let changed = json!({"doses": [{"ml": 2}, {"ml": 4}]});
        let rows = diff_snapshots(&before, &changed);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field, "doses");
    }

    #[test]
    fn non_object_snapshots_are_treated_as_empty() {
        let rows = diff_snapshots(&json!(null), &json!({"name": "Bella"}));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DiffStatus::Added);
    }

    // -----------------------------------------------------------------------
    // Status strings
    // -----------------------------------------------------------------------

    #[test]
    fn status_as_str() {
        assert_eq!(DiffStatus::Added.as_str(), "added");
        assert_eq!(DiffStatus::Removed.as_str(), "removed");
        assert_eq!(DiffStatus::Changed.as_str(), "changed");
        assert_eq!(DiffStatus::Unchanged.as_str(), "unchanged");
    }
}
