//! Validation of raw JSON payloads and list query parameters.
//!
//! Bodies arrive as `serde_json::Value` rather than typed structs because the
//! rules are about the key set itself: unknown keys are rejected by name,
//! `id` is rejected on update before anything else, and an absent key means
//! something different from an explicit `null`.

use chrono::{Datelike, DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound};
use serde_json::{Map, Value};

use crate::error::TodoError;
use crate::types::{ListQuery, NewTodo, TodoChanges, TodoFilter};

/// Keys accepted in a create body. `id` and the timestamps are accepted but
/// ignored.
pub const CREATE_KEYS: [&str; 7] = [
    "id",
    "title",
    "description",
    "completed",
    "deadline_at",
    "created_at",
    "updated_at",
];

/// Keys accepted in an update body.
pub const UPDATE_KEYS: [&str; 6] = [
    "title",
    "description",
    "completed",
    "deadline_at",
    "created_at",
    "updated_at",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

type Fields = Map<String, Value>;

/// Validate a create body.
pub fn parse_new_todo(body: &Value) -> Result<NewTodo, TodoError> {
    let fields = body.as_object().ok_or(TodoError::InvalidBody)?;
    reject_extra_keys(fields, &CREATE_KEYS)?;
    if !fields.contains_key("title") {
        return Err(TodoError::MissingTitle);
    }

    Ok(NewTodo {
        title: string_field(fields, "title")?.ok_or(TodoError::InvalidField {
            field: "title",
            expected: "a string",
        })?,
        description: nullable_string_field(fields, "description")?.flatten(),
        completed: bool_field(fields, "completed")?.unwrap_or(false),
        deadline_at: nullable_timestamp_field(fields, "deadline_at")?.flatten(),
    })
}

/// Check the key set of an update body and hand back its fields.
///
/// Value validation is deferred to [`parse_changes`] so that a missing record
/// is reported before a malformed value.
pub fn check_update_keys(body: &Value) -> Result<&Fields, TodoError> {
    let fields = body.as_object().ok_or(TodoError::InvalidBody)?;
    if fields.contains_key("id") {
        return Err(TodoError::ImmutableId);
    }
    reject_extra_keys(fields, &UPDATE_KEYS)?;
    Ok(fields)
}

/// Validate the values of an update body whose keys already passed
/// [`check_update_keys`].
pub fn parse_changes(fields: &Fields) -> Result<TodoChanges, TodoError> {
    Ok(TodoChanges {
        title: string_field(fields, "title")?,
        description: nullable_string_field(fields, "description")?,
        completed: bool_field(fields, "completed")?,
        deadline_at: nullable_timestamp_field(fields, "deadline_at")?,
    })
}

/// Years a timestamp may fall in. Four digits keep the stored text sortable.
const STORED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Turn raw list parameters into a filter relative to `now`.
///
/// Empty parameters are treated as absent.
pub fn parse_list_query(query: &ListQuery, now: NaiveDateTime) -> Result<TodoFilter, TodoError> {
    let completed = non_empty(&query.completed).map(|raw| raw.to_lowercase() == "true");

    let deadline_before = match non_empty(&query.window) {
        None => None,
        Some(raw) => {
            let invalid = || TodoError::InvalidWindow(raw.to_string());
            let days: i64 = raw.trim().parse().map_err(|_| invalid())?;
            let span = Duration::try_days(days).ok_or_else(invalid)?;
            let bound = now
                .checked_add_signed(span)
                .filter(|bound| STORED_YEARS.contains(&bound.year()))
                .ok_or_else(invalid)?;
            Some(bound)
        }
    };

    Ok(TodoFilter {
        completed,
        deadline_before,
    })
}

/// Parse an ISO-8601 date or date-time.
///
/// Values with an offset are converted to UTC; date-only values mean
/// midnight. Precision is cut to microseconds and years are limited to
/// 1..=9999, so every stored value has the same fixed-width text form.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.naive_utc()),
        Err(_) => NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .ok()
                    .map(|date| date.and_time(NaiveTime::MIN))
            }),
    };
    parsed
        .filter(|ts| STORED_YEARS.contains(&ts.year()))
        .map(|ts| ts.trunc_subsecs(6))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn reject_extra_keys(fields: &Fields, allowed: &[&str]) -> Result<(), TodoError> {
    let mut extra: Vec<String> = fields
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .cloned()
        .collect();
    if extra.is_empty() {
        return Ok(());
    }
    extra.sort();
    Err(TodoError::ExtraFields(extra))
}

fn string_field(fields: &Fields, field: &'static str) -> Result<Option<String>, TodoError> {
    match fields.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(TodoError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn nullable_string_field(
    fields: &Fields,
    field: &'static str,
) -> Result<Option<Option<String>>, TodoError> {
    match fields.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(TodoError::InvalidField {
            field,
            expected: "a string or null",
        }),
    }
}

fn bool_field(fields: &Fields, field: &'static str) -> Result<Option<bool>, TodoError> {
    match fields.get(field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(TodoError::InvalidField {
            field,
            expected: "a boolean",
        }),
    }
}

fn nullable_timestamp_field(
    fields: &Fields,
    field: &'static str,
) -> Result<Option<Option<NaiveDateTime>>, TodoError> {
    match fields.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(raw)) => parse_timestamp(raw)
            .map(|ts| Some(Some(ts)))
            .ok_or_else(|| TodoError::InvalidTimestamp {
                field,
                value: raw.clone(),
            }),
        Some(other) => Err(TodoError::InvalidTimestamp {
            field,
            value: other.to_string(),
        }),
    }
}
