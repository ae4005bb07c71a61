use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::status::LifecycleStatus;
use crate::store::resolve_timestamp;

/// Lenient accessor over a raw document; every read has a defined fallback.
pub(crate) struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    pub(crate) fn text(&self, key: &str) -> String {
        self.fields.get(key).map(value_as_text).unwrap_or_default()
    }

    /// First non-blank value among `keys`.
    pub(crate) fn first_text(&self, keys: &[&str]) -> String {
        keys.iter()
            .map(|key| self.text(key))
            .find(|value| !value.trim().is_empty())
            .unwrap_or_default()
    }

    pub(crate) fn text_or(&self, key: &str, fallback: &str) -> String {
        let value = self.text(key);
        if value.trim().is_empty() {
            fallback.to_string()
        } else {
            value
        }
    }

    pub(crate) fn optional_text(&self, key: &str) -> Option<String> {
        let value = self.text(key);
        (!value.trim().is_empty()).then_some(value)
    }

    pub(crate) fn status<S: LifecycleStatus>(&self) -> S {
        S::parse_or_initial(self.fields.get("status").and_then(Value::as_str))
    }

    pub(crate) fn timestamp(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        keys.iter()
            .filter_map(|key| self.fields.get(*key))
            .find_map(resolve_timestamp)
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
