//! JSON parsing with date revival.
//!
//! Response bodies are parsed with `serde_json` and then walked once: every
//! string value that reads as a full timestamp becomes a [`JsonValue::Date`].
//! Object keys are never touched.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Number, Value};

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(Z|[+-]\d{2}:\d{2})?$")
        .expect("timestamp pattern is valid")
});

/// A parsed JSON value whose timestamp strings have been revived as dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime<Utc>),
    Array(Vec<JsonValue>),
    Object(BTreeMap<String, JsonValue>),
}

impl JsonValue {
    /// Look up a member of an object.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Look up an element of an array.
    pub fn at(&self, index: usize) -> Option<&JsonValue> {
        match self {
            JsonValue::Array(items) => items.get(index),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            JsonValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JsonValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        revive(value)
    }
}

/// Parse `text` as JSON and revive timestamp strings.
pub fn parse(text: &str) -> Result<JsonValue, serde_json::Error> {
    serde_json::from_str::<Value>(text).map(revive)
}

/// Convert a plain JSON value, reviving timestamp strings recursively.
pub fn revive(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Number(n) => JsonValue::Number(n),
        Value::String(s) => match parse_timestamp(&s) {
            Some(date) => JsonValue::Date(date),
            None => JsonValue::String(s),
        },
        Value::Array(items) => JsonValue::Array(items.into_iter().map(revive).collect()),
        Value::Object(map) => JsonValue::Object(map.into_iter().map(|(k, v)| (k, revive(v))).collect()),
    }
}

/// Read `s` as a timestamp if it matches the pattern and names a real instant.
///
/// A timestamp without an offset is taken to be UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let caps = TIMESTAMP.captures(s)?;
    match caps.get(1) {
        Some(_) => DateTime::parse_from_rfc3339(s).ok().map(|d| d.with_timezone(&Utc)),
        None => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc()),
    }
}
