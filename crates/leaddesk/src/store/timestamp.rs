use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Resolve the timestamp shapes the document store hands back.
///
/// Accepts RFC 3339 strings, `{seconds, nanoseconds}` objects (with or without
/// a leading underscore on the keys) and integer epoch milliseconds.
pub fn resolve_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => parse_rfc3339(raw),
        Value::Object(map) => from_seconds_object(map),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Encode an instant the way the store persists server-side timestamps.
pub fn timestamp_object(instant: DateTime<Utc>) -> Value {
    let mut map = Map::new();
    map.insert("seconds".to_string(), Value::from(instant.timestamp()));
    map.insert(
        "nanoseconds".to_string(),
        Value::from(instant.timestamp_subsec_nanos()),
    );
    Value::Object(map)
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn from_seconds_object(map: &Map<String, Value>) -> Option<DateTime<Utc>> {
    let seconds = map
        .get("seconds")
        .or_else(|| map.get("_seconds"))
        .and_then(Value::as_i64)?;
    let nanos = map
        .get("nanoseconds")
        .or_else(|| map.get("_nanoseconds"))
        .and_then(Value::as_u64)
        .and_then(|nanos| u32::try_from(nanos).ok())
        .unwrap_or(0);

    Utc.timestamp_opt(seconds, nanos).single()
}
