//! Capabilities a domain type implements to be carried over the wire.
//!
//! # Design
//! There is no base class. A type opts in to each capability separately:
//! - `PropertyModel`: it has a descriptor table and can hand out and accept
//!   field values by wire name. This is what the property codec walks.
//! - `Identified`: it carries `ObjectMeta` (id, timestamps, archived flag),
//!   which the property-bag adapter fills from fixed top-level keys.
//! - serde's `Serialize`/`Deserialize`: the flat wire shape.
//!
//! `Entity` is the blanket combination the serializer facade asks for.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::metadata::ModelSchema;
use crate::value::{FieldValue, PropertyValue};

pub trait PropertyModel: Default {
    /// The type's descriptor table, built once.
    fn schema() -> &'static ModelSchema;

    /// Current value of the field with `wire_name`, or `None` when unset.
    fn read_field(&self, wire_name: &str) -> Option<FieldValue>;

    /// Assigns an inbound value to the field with `wire_name`. Values that do
    /// not parse into the field's type leave the field unset.
    fn write_field(&mut self, wire_name: &str, value: PropertyValue);
}

/// Top-level object metadata. Never part of the property bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// v3 endpoints send ids as strings, legacy ones as numbers.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::integer"
    )]
    pub id: Option<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::boolean"
    )]
    pub archived: Option<bool>,
}

impl ObjectMeta {
    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }
}

pub trait Identified {
    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    fn id(&self) -> Option<i64> {
        self.meta().id
    }
}

pub trait Entity: PropertyModel + Identified + Serialize + DeserializeOwned {}

impl<T> Entity for T where T: PropertyModel + Identified + Serialize + DeserializeOwned {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_accepts_string_or_number() {
        let meta: ObjectMeta = serde_json::from_str(r#"{"id":"42"}"#).unwrap();
        assert_eq!(meta.id, Some(42));
        let meta: ObjectMeta = serde_json::from_str(r#"{"id":42}"#).unwrap();
        assert_eq!(meta.id, Some(42));
        let meta: ObjectMeta = serde_json::from_str(r#"{"id":null}"#).unwrap();
        assert_eq!(meta.id, None);
        let meta: ObjectMeta = serde_json::from_str(r#"{"id":"abc","archived":"false"}"#).unwrap();
        assert_eq!(meta.id, None);
        assert_eq!(meta.archived, Some(false));
    }

    #[test]
    fn unset_fields_are_omitted() {
        let json = serde_json::to_value(ObjectMeta::with_id(7)).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7}));
    }

    #[test]
    fn timestamps_use_camel_case() {
        let meta: ObjectMeta = serde_json::from_str(
            r#"{"createdAt":"2022-01-24T10:00:00Z","updatedAt":"2022-01-25T10:00:00Z","archived":false}"#,
        )
        .unwrap();
        assert_eq!(meta.created_at.unwrap().timestamp(), 1_643_018_400);
        assert_eq!(meta.archived, Some(false));
        assert!(meta.updated_at > meta.created_at);
    }
}
