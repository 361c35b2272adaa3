//! Record normalizer: coerces loose input into the canonical record shape
//!
//! Normalization never fails. Anything that cannot be interpreted falls back
//! to the field's default, and an existing `uuid` is always preserved.

use crate::record::{GradeCode, Record};
use serde_json::Value;

/// Quantity used when the input has none or it is not numeric
pub const DEFAULT_QUANTITY: i64 = 1;

/// Normalize a raw JSON object (possibly partial, possibly legacy) into a record
pub fn normalize(raw: &Value) -> Record {
    let text = |key: &str| raw.get(key).and_then(value_text);

    let quantity = match raw.get("quantity") {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f as i64)
            .unwrap_or(DEFAULT_QUANTITY),
        Some(Value::String(s)) => coerce_quantity(s),
        _ => DEFAULT_QUANTITY,
    };

    let record = Record {
        uuid: text("uuid").unwrap_or_default(),
        title: text("title").unwrap_or_default(),
        publisher: text("publisher").unwrap_or_default(),
        volume: text("volume").unwrap_or_default(),
        issue: text("issue").unwrap_or_default(),
        month: text("month"),
        year: text("year").unwrap_or_default(),
        quantity,
        value: text("value").unwrap_or_default(),
        condition: text("condition")
            .and_then(|c| GradeCode::from_code(&c))
            .unwrap_or_default(),
        comic_type: text("type"),
        writer: names(raw.get("writer")),
        artist: names(raw.get("artist")),
        comments: text("comments"),
    };

    normalize_record(record)
}

/// Re-apply every coercion to an already typed record.
///
/// Used after edits so that month padding and value formatting are restored.
pub fn normalize_record(mut record: Record) -> Record {
    if record.uuid.is_empty() {
        record.uuid = new_uuid();
    }
    record.month = record.month.as_deref().and_then(normalize_month);
    record.value = normalize_value(&record.value);
    record.comic_type = record.comic_type.filter(|t| !t.is_empty());
    record.comments = record.comments.filter(|c| !c.is_empty());
    record.writer.retain(|name| !name.trim().is_empty());
    record.artist.retain(|name| !name.trim().is_empty());
    record
}

/// Fresh random identity for a new record
pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Two-digit month for positive numbers, the raw text otherwise, `None` when empty
pub fn normalize_month(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    match parse_number(raw) {
        Some(n) if n > 0.0 => Some(format!("{:0>2}", format_number(n))),
        _ => Some(raw.to_string()),
    }
}

/// Two decimal places for positive amounts, the raw text otherwise
pub fn normalize_value(raw: &str) -> String {
    match parse_number(raw) {
        Some(n) if n > 0.0 => format!("{:.2}", n),
        _ => raw.to_string(),
    }
}

/// Integer quantity from text, falling back to [`DEFAULT_QUANTITY`]
pub fn coerce_quantity(raw: &str) -> i64 {
    parse_number(raw)
        .map(|n| n as i64)
        .unwrap_or(DEFAULT_QUANTITY)
}

/// Parse text as a finite number. Blank text is not a number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Render a number without a trailing ".0" for whole values
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

fn names(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_text)
            .filter(|name| !name.trim().is_empty())
            .collect(),
        _ => Vec::new(),
    }
}
