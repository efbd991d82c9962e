//! Values crossing the property codec.
//!
//! `FieldValue` is what a model hands out when it is flattened: a typed value
//! the codec still has to render. `PropertyValue` is what travels inside a
//! key-value pair on the wire: either a plain string or, for complex fields,
//! a JSON structure passed through untouched.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

use crate::pairs::KeyValuePair;

/// The value half of a key-value pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Json(Value),
}

impl PropertyValue {
    /// Converts an inbound JSON value. `null` has no pair representation.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(PropertyValue::Text(s)),
            Value::Bool(b) => Some(PropertyValue::Text(b.to_string())),
            Value::Number(n) => Some(PropertyValue::Text(n.to_string())),
            other => Some(PropertyValue::Json(other)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            PropertyValue::Text(s) => Value::String(s.clone()),
            PropertyValue::Json(v) => v.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::Json(Value::String(s)) => Some(s),
            PropertyValue::Json(_) => None,
        }
    }

    /// The raw string, or the JSON text of a structured value.
    pub fn into_text(self) -> String {
        match self {
            PropertyValue::Text(s) => s,
            PropertyValue::Json(Value::String(s)) => s,
            PropertyValue::Json(v) => v.to_string(),
        }
    }

    /// Empty strings read as absent for every typed coercion below.
    fn trimmed(&self) -> Option<&str> {
        self.as_str().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn to_i64(&self) -> Option<i64> {
        let raw = self.trimmed()?;
        raw.parse()
            .map_err(|_| debug!(value = raw, "dropping non-integer property value"))
            .ok()
    }

    pub fn to_f64(&self) -> Option<f64> {
        let raw = self.trimmed()?;
        raw.parse()
            .map_err(|_| debug!(value = raw, "dropping non-numeric property value"))
            .ok()
    }

    pub fn to_bool(&self) -> Option<bool> {
        match self.trimmed()? {
            s if s.eq_ignore_ascii_case("true") => Some(true),
            s if s.eq_ignore_ascii_case("false") => Some(false),
            s => {
                debug!(value = s, "dropping non-boolean property value");
                None
            }
        }
    }

    /// Accepts `yyyy-MM-dd`, RFC 3339 and epoch milliseconds.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let raw = self.trimmed()?;
        if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Some(date);
        }
        parse_instant(raw).map(|t| t.date_naive())
    }

    /// Accepts RFC 3339, epoch milliseconds and `yyyy-MM-dd` (as midnight UTC).
    pub fn to_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.trimmed()?;
        if let Some(instant) = parse_instant(raw) {
            return Some(instant);
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .map(midnight_utc)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

/// Default wire format of date values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(millis) = raw.parse::<i64>() {
        return DateTime::<Utc>::from_timestamp_millis(millis);
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(_) => {
            debug!(value = raw, "dropping unparsable date property value");
            None
        }
    }
}

/// A model field's current value, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Json(Value),
    Pairs(Vec<KeyValuePair>),
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl From<Value> for FieldValue {
    fn from(v: Value) -> Self {
        FieldValue::Json(v)
    }
}

impl From<Vec<KeyValuePair>> for FieldValue {
    fn from(v: Vec<KeyValuePair>) -> Self {
        FieldValue::Pairs(v)
    }
}
