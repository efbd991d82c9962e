//! Response shape adapter: wire JSON to entities and back.
//!
//! # Design
//! The shape is chosen by the caller for each call and is never sniffed from
//! the payload.
//!
//! - `Flat`: the body is the entity's own serde form. Field names equal the
//!   descriptor wire names, so nothing here touches the property codec.
//! - `PropertyBag`: metadata sits at fixed top-level keys and everything else
//!   inside a `properties` container that goes through `codec::hydrate`.
//!   Outbound, only the flattened pairs are written, under `properties`.
//!
//! Missing metadata leaves the entity's defaults. A missing or unusable
//! `properties` container reads as an empty bag.

use serde_json::{Map, Value};
use tracing::warn;

use crate::codec;
use crate::model::{Entity, ObjectMeta};
use crate::pairs::{PairStyle, PropertyBag};
use crate::value::PropertyValue;

/// Key of the pair container in property-bag bodies.
pub const PROPERTIES_KEY: &str = "properties";

/// Identifier keys, in lookup order. Legacy endpoints name the id after the
/// object type.
const ID_KEYS: [&str; 5] = ["id", "vid", "companyId", "dealId", "objectId"];

/// The JSON convention an endpoint uses for entity bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WireShape {
    Flat,
    #[default]
    PropertyBag,
}

/// Reads the fixed metadata keys of a property-bag body. Values that do not
/// parse are left unset.
pub fn read_metadata(object: &Map<String, Value>) -> ObjectMeta {
    let property = |key: &str| {
        object
            .get(key)
            .cloned()
            .and_then(PropertyValue::from_json)
    };
    ObjectMeta {
        id: ID_KEYS
            .iter()
            .find_map(|key| property(*key).and_then(|id| id.to_i64())),
        created_at: property("createdAt").and_then(|v| v.to_timestamp()),
        updated_at: property("updatedAt").and_then(|v| v.to_timestamp()),
        archived: property("archived").and_then(|v| v.to_bool()),
    }
}

/// Builds an entity from one parsed element.
///
/// Only the `Flat` shape can fail, when the element is not an object. Scalar
/// fields coerce across strings and numbers and drop what does not parse.
pub fn entity_from_value<T: Entity>(value: Value, shape: WireShape) -> Result<T, serde_json::Error> {
    match shape {
        WireShape::Flat => serde_json::from_value(value),
        WireShape::PropertyBag => Ok(hydrate_property_bag(value)),
    }
}

fn hydrate_property_bag<T: Entity>(value: Value) -> T {
    let mut entity = T::default();
    let Value::Object(object) = value else {
        warn!(model = T::schema().name(), "property-bag body is not an object, reading as empty");
        return entity;
    };
    *entity.meta_mut() = read_metadata(&object);
    match object.get(PROPERTIES_KEY) {
        Some(container) => codec::hydrate(&mut entity, PropertyBag::from_json(container)),
        None => warn!(
            model = T::schema().name(),
            "property-bag body has no properties container"
        ),
    }
    entity
}

/// Renders an entity in `shape`. Pairs are written with `style`.
pub fn entity_to_value<T: Entity>(
    entity: &T,
    shape: WireShape,
    style: PairStyle,
) -> Result<Value, serde_json::Error> {
    match shape {
        WireShape::Flat => serde_json::to_value(entity).map(strip_nulls),
        WireShape::PropertyBag => {
            let mut body = Map::with_capacity(1);
            body.insert(
                PROPERTIES_KEY.to_string(),
                codec::flatten(entity).to_json(style),
            );
            Ok(Value::Object(body))
        }
    }
}

/// Removes top-level `null` members. Nested values are left as they are.
pub(crate) fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(object) => Value::Object(
            object
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::metadata::{FieldDescriptor, ModelSchema};
    use crate::model::{Identified, PropertyModel};
    use crate::value::FieldValue;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(flatten)]
        meta: ObjectMeta,
        #[serde(default, deserialize_with = "crate::lenient::text")]
        subject: Option<String>,
        #[serde(default)]
        nested: Option<Value>,
    }

    const NOTE_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::new("subject"),
        FieldDescriptor::new("nested").complex(),
    ];

    impl PropertyModel for Note {
        fn schema() -> &'static ModelSchema {
            static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
            SCHEMA.get_or_init(|| ModelSchema::new("note", NOTE_FIELDS))
        }

        fn read_field(&self, wire_name: &str) -> Option<FieldValue> {
            match wire_name {
                "subject" => self.subject.clone().map(Into::into),
                "nested" => self.nested.clone().map(Into::into),
                _ => None,
            }
        }

        fn write_field(&mut self, wire_name: &str, value: PropertyValue) {
            match wire_name {
                "subject" => self.subject = Some(value.into_text()),
                "nested" => self.nested = Some(value.to_json()),
                _ => {}
            }
        }
    }

    impl Identified for Note {
        fn meta(&self) -> &ObjectMeta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut ObjectMeta {
            &mut self.meta
        }
    }

    #[test]
    fn v3_body_fills_metadata_and_properties() {
        let note: Note = entity_from_value(
            json!({
                "id": "42",
                "createdAt": "2022-01-24T10:00:00.000Z",
                "archived": false,
                "properties": {"subject": {"value": "Subject A"}, "hs_object_id": "42"}
            }),
            WireShape::PropertyBag,
        )
        .unwrap();
        assert_eq!(note.meta.id, Some(42));
        assert_eq!(note.meta.archived, Some(false));
        assert!(note.meta.created_at.is_some());
        assert_eq!(note.meta.updated_at, None);
        assert_eq!(note.subject.as_deref(), Some("Subject A"));
    }

    #[test]
    fn id_inside_properties_is_not_metadata() {
        let note: Note = entity_from_value(
            json!({"properties": [{"name": "id", "value": "7"}, {"name": "subject", "value": "S"}]}),
            WireShape::PropertyBag,
        )
        .unwrap();
        assert_eq!(note.meta.id, None);
        assert_eq!(note.subject.as_deref(), Some("S"));
    }

    #[test]
    fn legacy_id_aliases() {
        let note: Note = entity_from_value(
            json!({"vid": 901, "properties": [{"property": "subject", "value": "Legacy"}]}),
            WireShape::PropertyBag,
        )
        .unwrap();
        assert_eq!(note.meta.id, Some(901));
        assert_eq!(note.subject.as_deref(), Some("Legacy"));

        let meta = read_metadata(json!({"companyId": "5", "updatedAt": 1642982400000_i64}).as_object().unwrap());
        assert_eq!(meta.id, Some(5));
        assert_eq!(meta.updated_at.unwrap().timestamp_millis(), 1_642_982_400_000);
    }

    #[test]
    fn unparsable_id_falls_through_to_next_alias() {
        let meta = read_metadata(json!({"id": "n/a", "vid": 901}).as_object().unwrap());
        assert_eq!(meta.id, Some(901));

        let meta = read_metadata(json!({"id": "", "companyId": "5"}).as_object().unwrap());
        assert_eq!(meta.id, Some(5));

        let meta = read_metadata(json!({"id": "n/a"}).as_object().unwrap());
        assert_eq!(meta.id, None);
    }

    #[test]
    fn missing_properties_reads_as_empty() {
        let note: Note = entity_from_value(json!({"id": "3"}), WireShape::PropertyBag).unwrap();
        assert_eq!(note.meta.id, Some(3));
        assert_eq!(note.subject, None);

        let note: Note = entity_from_value(json!("not an entity"), WireShape::PropertyBag).unwrap();
        assert_eq!(note, Note::default());
    }

    #[test]
    fn property_bag_outbound_carries_only_properties() {
        let note = Note {
            meta: ObjectMeta::with_id(42),
            subject: Some("Subject A".to_string()),
            nested: Some(json!({"a": [1]})),
        };
        let body = entity_to_value(&note, WireShape::PropertyBag, PairStyle::Name).unwrap();
        assert_eq!(
            body,
            json!({"properties": [
                {"name": "subject", "value": "Subject A"},
                {"name": "nested", "value": {"a": [1]}}
            ]})
        );
    }

    #[test]
    fn flat_outbound_drops_nulls() {
        let note = Note {
            meta: ObjectMeta::with_id(1),
            subject: None,
            nested: None,
        };
        let body = entity_to_value(&note, WireShape::Flat, PairStyle::Name).unwrap();
        assert_eq!(body, json!({"id": 1}));
    }

    #[test]
    fn flat_inbound_uses_serde_names() {
        let note: Note =
            entity_from_value(json!({"id": "9", "subject": "S", "unknown": 1}), WireShape::Flat).unwrap();
        assert_eq!(note.meta.id, Some(9));
        assert_eq!(note.subject.as_deref(), Some("S"));
        assert!(entity_from_value::<Note>(json!("just text"), WireShape::Flat).is_err());
    }

    #[test]
    fn flat_inbound_coerces_numbers_into_text() {
        let note: Note = entity_from_value(json!({"id": 9, "subject": 12}), WireShape::Flat).unwrap();
        assert_eq!(note.meta.id, Some(9));
        assert_eq!(note.subject.as_deref(), Some("12"));

        let note: Note =
            entity_from_value(json!({"id": "nine", "subject": ["a"]}), WireShape::Flat).unwrap();
        assert_eq!(note, Note::default());
    }

    #[test]
    fn strip_nulls_is_top_level_only() {
        let value = strip_nulls(json!({"a": null, "b": {"c": null}}));
        assert_eq!(value, json!({"b": {"c": null}}));
    }
}
