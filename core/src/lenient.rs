//! `deserialize_with` helpers for flat bodies.
//!
//! # Design
//! The vendor is loose about scalar types: ids and counts arrive as strings
//! or numbers, text fields occasionally as numbers. Every helper reads any
//! JSON scalar and coerces it with the same rules the property codec uses
//! (`PropertyValue`), so a flat body and a property bag accept the same
//! values. A value that does not coerce leaves the field unset and logs at
//! `debug!`; it never fails the surrounding struct.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::value::PropertyValue;

/// Reads one field as a scalar. Structured values are dropped.
fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<PropertyValue>, D::Error> {
    match PropertyValue::from_json(Value::deserialize(deserializer)?) {
        Some(PropertyValue::Json(value)) => {
            debug!(value = %value, "dropping structured value in a scalar field");
            Ok(None)
        }
        other => Ok(other),
    }
}

pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar(deserializer)?.map(PropertyValue::into_text))
}

/// Any integer type; values outside its range are dropped.
pub fn integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    Ok(scalar(deserializer)?
        .and_then(|value| value.to_i64())
        .and_then(|n| {
            T::try_from(n)
                .map_err(|_| debug!(value = n, "dropping out-of-range integer"))
                .ok()
        }))
}

/// `integer` for fields that are not optional on the Rust side.
pub fn integer_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + Default,
{
    Ok(integer(deserializer)?.unwrap_or_default())
}

pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(scalar(deserializer)?.and_then(|value| value.to_f64()))
}

pub fn boolean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Ok(scalar(deserializer)?.and_then(|value| value.to_bool()))
}

pub fn boolean_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(boolean(deserializer)?.unwrap_or_default())
}

pub fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(scalar(deserializer)?.and_then(|value| value.to_date()))
}

pub fn timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(scalar(deserializer)?.and_then(|value| value.to_timestamp()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "text")]
        label: Option<String>,
        #[serde(default, deserialize_with = "integer")]
        count: Option<i64>,
        #[serde(default, deserialize_with = "integer_or_default")]
        order: i32,
        #[serde(default, deserialize_with = "float")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "boolean")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "date")]
        day: Option<NaiveDate>,
        #[serde(default, deserialize_with = "timestamp")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn numbers_and_strings_interchange() {
        let row: Row = serde_json::from_value(json!({
            "label": 12,
            "count": "77",
            "order": "2",
            "amount": "1200.5",
            "flag": "TRUE",
            "day": "2022-01-24",
            "at": 1643038200000_i64
        }))
        .unwrap();
        assert_eq!(row.label.as_deref(), Some("12"));
        assert_eq!(row.count, Some(77));
        assert_eq!(row.order, 2);
        assert_eq!(row.amount, Some(1200.5));
        assert_eq!(row.flag, Some(true));
        assert_eq!(row.day, NaiveDate::from_ymd_opt(2022, 1, 24));
        assert_eq!(row.at.unwrap().timestamp_millis(), 1_643_038_200_000);
    }

    #[test]
    fn unusable_values_leave_fields_unset() {
        let row: Row = serde_json::from_value(json!({
            "label": {"nested": true},
            "count": "seventy",
            "order": 4_294_967_296_i64,
            "amount": [1],
            "flag": "maybe",
            "day": "",
            "at": null
        }))
        .unwrap();
        assert_eq!(row, Row::default());
    }
}
