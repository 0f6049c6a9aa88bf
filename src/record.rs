use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{InputError, RecordError};

pub const CATEGORY_USER_INTERACTION: &str = "user_interaction";
pub const CATEGORY_HARDWARE: &str = "hardware";
pub const CATEGORY_SECURITY: &str = "security";

/// One structured log entry as emitted by the AV control application.
///
/// `null` is treated as absent for every field. The timestamp is parsed once
/// at construction; a missing or unparseable timestamp only removes the record
/// from time-based computations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogRecord {
    pub id: Option<Value>,
    pub timestamp: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
    pub message: Option<String>,
    pub action: Option<String>,
    pub success: Option<bool>,
    pub duration: Option<f64>,
    pub device_type: Option<String>,
    time: Option<DateTime<FixedOffset>>,
}

pub type LogBatch = Vec<LogRecord>;

impl LogRecord {
    pub fn from_value(index: usize, v: &Value) -> Result<Self, RecordError> {
        let obj = v.as_object().ok_or(RecordError::NotObject { index })?;

        let timestamp = obj.get("timestamp").and_then(Value::as_str).map(str::to_string);
        let time = timestamp.as_deref().and_then(parse_timestamp);
        if let (Some(raw), None) = (timestamp.as_deref(), time) {
            debug!(index, timestamp = raw, "unparseable timestamp skipped");
        }

        let duration = match obj.get("duration") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                return Err(RecordError::FieldType { index, field: "duration", expected: "a number" })
            }
        };

        Ok(LogRecord {
            id: obj.get("id").filter(|v| !v.is_null()).cloned(),
            timestamp,
            level: string_field(obj, index, "level")?,
            category: string_field(obj, index, "category")?,
            message: string_field(obj, index, "message")?,
            action: string_field(obj, index, "action")?,
            // non-boolean success values are not outcome-bearing
            success: obj.get("success").and_then(Value::as_bool),
            duration,
            device_type: string_field(obj, index, "deviceType")?.filter(|d| !d.is_empty()),
            time,
        })
    }

    /// Parsed timestamp in the offset it was written with.
    pub fn time(&self) -> Option<DateTime<FixedOffset>> {
        self.time
    }

    /// Exact `"error"` / `"critical"` level match.
    pub fn is_error(&self) -> bool {
        matches!(self.level.as_deref(), Some("error") | Some("critical"))
    }

    /// Level match ignoring ASCII case; only the severity tier uses this.
    pub fn is_error_any_case(&self) -> bool {
        self.level
            .as_deref()
            .map(|l| l.eq_ignore_ascii_case("error") || l.eq_ignore_ascii_case("critical"))
            .unwrap_or(false)
    }

    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category)
    }
}

fn string_field(
    obj: &Map<String, Value>,
    index: usize,
    field: &'static str,
) -> Result<Option<String>, RecordError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RecordError::FieldType { index, field, expected: "a string" }),
    }
}

/// Returns the `logs` array of an input document.
pub fn extract_logs(doc: &Value) -> Result<&[Value], InputError> {
    let obj = doc.as_object().ok_or(InputError::NotObject)?;
    match obj.get("logs") {
        Some(Value::Array(items)) => Ok(items.as_slice()),
        _ => Err(InputError::MissingLogs),
    }
}

pub fn records_from_values(values: &[Value]) -> Result<LogBatch, RecordError> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| LogRecord::from_value(i, v))
        .collect()
}

/// Parses an ISO-8601 timestamp. A trailing `Z` means UTC; timestamps without
/// an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.replace('Z', "+00:00");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return Some(dt);
    }
    let zoned = [
        "%Y-%m-%dT%H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S%:z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%dT%H:%M%:z",
    ];
    for f in zoned.iter() {
        if let Ok(dt) = DateTime::parse_from_str(&s, f) {
            return Some(dt);
        }
    }
    let naive = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for f in naive.iter() {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(&s, f) {
            return Some(Utc.from_utc_datetime(&ndt).into());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        let ndt = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&ndt).into());
    }
    None
}
