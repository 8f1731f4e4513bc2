//! Version-tolerant decoding of stored task collections.
//!
//! # Responsibility
//! - Accept the canonical shape and every earlier stored shape.
//! - Map legacy fields (`done`, `due`, string priorities, ISO timestamps,
//!   non-UUID ids) onto the canonical `Task`.
//! - Carry optional `notes` and `tags` through unchanged in meaning.
//!
//! # Invariants
//! - Entries without a usable id or title are dropped, never guessed.
//! - The same legacy id always maps to the same `TaskId`.
//! - Duplicate ids keep their first occurrence.

use crate::model::task::{Task, TaskId, TaskPriority, TaskStatus};
use crate::repo::task_repo::{RepoError, RepoResult};
use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

/// Namespace for deriving stable UUIDv5 ids from legacy id strings.
pub const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c69_6665_6f73_4a11_8c3e_7a5d_2f91_b004);

static DATE_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})").expect("valid date prefix regex"));

/// Decodes one stored slot value into canonical tasks.
///
/// `fallback_created_at` fills `createdAt` for shapes that never stored it.
///
/// # Errors
/// - `InvalidData` when `raw` is not JSON or not a JSON array.
pub fn decode_tasks(raw: &str, fallback_created_at: i64) -> RepoResult<Vec<Task>> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("stored tasks are not JSON: {err}")))?;
    let Value::Array(entries) = value else {
        return Err(RepoError::InvalidData(
            "stored tasks are not a JSON array".to_string(),
        ));
    };

    let mut seen = HashSet::with_capacity(entries.len());
    let tasks = entries
        .into_iter()
        .filter_map(|entry| decode_entry(entry, fallback_created_at))
        .filter(|task| seen.insert(task.id))
        .collect();
    Ok(tasks)
}

fn decode_entry(entry: Value, fallback_created_at: i64) -> Option<Task> {
    if let Ok(task) = Task::deserialize(&entry) {
        return Some(task);
    }
    let Value::Object(fields) = &entry else {
        return None;
    };
    decode_legacy_fields(fields, fallback_created_at)
}

fn decode_legacy_fields(fields: &Map<String, Value>, fallback_created_at: i64) -> Option<Task> {
    let id = legacy_id(fields.get("id")?)?;
    let title = fields.get("title")?.as_str()?;
    let priority = fields
        .get("priority")
        .map(legacy_priority)
        .unwrap_or_default();
    let due_date = fields
        .get("dueDate")
        .or_else(|| fields.get("due"))
        .and_then(legacy_due_date);
    let created_at = fields
        .get("createdAt")
        .and_then(legacy_created_at)
        .unwrap_or(fallback_created_at);

    let notes = fields.get("notes").and_then(Value::as_str);
    let tags = legacy_tags(fields.get("tags"));

    let mut task = Task::with_id(id, title, priority, due_date, created_at)
        .ok()?
        .with_details(notes, &tags);
    if legacy_is_done(fields) {
        task.status = TaskStatus::Done;
    }
    Some(task)
}

fn legacy_id(value: &Value) -> Option<TaskId> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    let uuid = Uuid::parse_str(&text)
        .unwrap_or_else(|_| Uuid::new_v5(&LEGACY_ID_NAMESPACE, text.as_bytes()));
    Some(TaskId(uuid))
}

fn legacy_priority(value: &Value) -> TaskPriority {
    match value {
        Value::Number(number) => number
            .as_u64()
            .and_then(|ordinal| u8::try_from(ordinal).ok())
            .and_then(|ordinal| TaskPriority::try_from(ordinal).ok())
            .unwrap_or_default(),
        Value::String(label) => match label.trim().to_ascii_lowercase().as_str() {
            "high" => TaskPriority::Critical,
            "medium" => TaskPriority::Normal,
            other => TaskPriority::from_str(other).unwrap_or_default(),
        },
        _ => TaskPriority::default(),
    }
}

fn legacy_due_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?;
    let captures = DATE_PREFIX_RE.captures(text)?;
    NaiveDate::parse_from_str(captures.get(1)?.as_str(), "%Y-%m-%d").ok()
}

fn legacy_created_at(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis as i64)),
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|instant| instant.timestamp_millis()),
        _ => None,
    }
}

fn legacy_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(joined)) => joined.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn legacy_is_done(fields: &Map<String, Value>) -> bool {
    let status_done = fields
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| status.trim().eq_ignore_ascii_case("done"));
    let flag_done = fields.get("done").and_then(Value::as_bool).unwrap_or(false);
    status_done || flag_done
}

#[cfg(test)]
mod tests {
    use super::{legacy_due_date, legacy_priority};
    use crate::model::task::TaskPriority;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn due_date_keeps_date_prefix_of_iso_timestamps() {
        assert_eq!(
            legacy_due_date(&json!("2025-12-19T08:00:00.000Z")),
            NaiveDate::from_ymd_opt(2025, 12, 19)
        );
        assert_eq!(legacy_due_date(&json!("next week")), None);
        assert_eq!(legacy_due_date(&json!("2025-02-30")), None);
        assert_eq!(legacy_due_date(&json!(null)), None);
    }

    #[test]
    fn priority_maps_every_historical_label() {
        assert_eq!(legacy_priority(&json!("high")), TaskPriority::Critical);
        assert_eq!(legacy_priority(&json!("critical")), TaskPriority::Critical);
        assert_eq!(legacy_priority(&json!("low")), TaskPriority::Low);
        assert_eq!(legacy_priority(&json!(3)), TaskPriority::Low);
        assert_eq!(legacy_priority(&json!(9)), TaskPriority::Normal);
        assert_eq!(legacy_priority(&json!("whenever")), TaskPriority::Normal);
    }
}
