//! Entity serializer: the text-level entry points.
//!
//! # Design
//! `EntitySerializer` is a small `Copy` value with no state beyond the pair
//! style it writes. Single-entity and list entry points are separate because
//! the list envelope (`ListShape`) is independent of the element shape
//! (`WireShape`). The only fatal entity decoding error is text that is not
//! JSON, and it carries the raw body. A body that is JSON but not an entity
//! reads as an empty one. A list element that cannot be read is dropped with
//! a `warn!` and the rest of the page survives.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{ApiError, Result};
use crate::model::Entity;
use crate::paging::{ListShape, Page};
use crate::pairs::PairStyle;
use crate::shape::{self, WireShape};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntitySerializer {
    pair_style: PairStyle,
}

impl EntitySerializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer that writes pairs with `style`.
    pub fn with_pair_style(pair_style: PairStyle) -> Self {
        Self { pair_style }
    }

    pub fn pair_style(&self) -> PairStyle {
        self.pair_style
    }

    /// Renders `entity` as JSON text in `shape`.
    pub fn serialize<T: Entity>(&self, entity: &T, shape: WireShape) -> Result<String> {
        let value = self.serialize_value(entity, shape)?;
        serde_json::to_string(&value).map_err(|e| ApiError::Serialization(e.to_string()))
    }

    pub fn serialize_value<T: Entity>(&self, entity: &T, shape: WireShape) -> Result<Value> {
        shape::entity_to_value(entity, shape, self.pair_style)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// Renders any flat payload (association specs, search bodies) with
    /// top-level nulls removed.
    pub fn serialize_flat<T: Serialize + ?Sized>(&self, payload: &T) -> Result<String> {
        let value = serde_json::to_value(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        serde_json::to_string(&shape::strip_nulls(value))
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    pub fn deserialize<T: Entity>(&self, body: &str, shape: WireShape) -> Result<T> {
        let value = parse(body)?;
        Ok(shape::entity_from_value(value, shape).unwrap_or_else(|e| {
            warn!(model = T::schema().name(), error = %e, "unreadable entity body, reading as empty");
            T::default()
        }))
    }

    /// Reads a list envelope whose elements are entities in `shape`.
    pub fn deserialize_page<T: Entity>(
        &self,
        body: &str,
        list: ListShape,
        shape: WireShape,
    ) -> Result<Page<T>> {
        let (items, next) = list.split(&parse(body)?);
        let results = read_elements(items, |item| shape::entity_from_value(item, shape));
        Ok(Page { results, next })
    }

    /// Reads a body that is a plain serde type rather than an entity.
    pub fn deserialize_flat<T: DeserializeOwned>(&self, body: &str) -> Result<T> {
        serde_json::from_str(body).map_err(|e| ApiError::malformed(e, body))
    }

    /// Reads a list envelope whose elements are plain serde types.
    pub fn deserialize_flat_page<T: DeserializeOwned>(
        &self,
        body: &str,
        list: ListShape,
    ) -> Result<Page<T>> {
        let (items, next) = list.split(&parse(body)?);
        let results = read_elements(items, serde_json::from_value);
        Ok(Page { results, next })
    }
}

fn parse(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| ApiError::malformed(e, body))
}

/// Reads each list element, skipping the ones that are not objects or do not
/// decode.
fn read_elements<T>(
    items: Vec<Value>,
    mut read: impl FnMut(Value) -> serde_json::Result<T>,
) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if !item.is_object() {
                warn!(index, "skipping list element that is not an object");
                return None;
            }
            read(item)
                .map_err(|e| warn!(index, error = %e, "skipping unreadable list element"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::model::ObjectMeta;
    use crate::objects::Ticket;
    use crate::paging::Continuation;

    fn ticket() -> Ticket {
        Ticket {
            meta: ObjectMeta::with_id(42),
            subject: Some("Subject A".to_string()),
            pipeline: Some("0".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn property_bag_is_the_default_shape() {
        assert_eq!(WireShape::default(), WireShape::PropertyBag);
        assert_eq!(EntitySerializer::new().pair_style(), PairStyle::Name);
    }

    #[test]
    fn serialize_property_bag_text() {
        let text = EntitySerializer::new()
            .serialize(&ticket(), WireShape::PropertyBag)
            .unwrap();
        assert_eq!(
            text,
            r#"{"properties":[{"name":"hs_pipeline","value":"0"},{"name":"subject","value":"Subject A"}]}"#
        );
    }

    #[test]
    fn property_style_pairs() {
        let value = EntitySerializer::with_pair_style(PairStyle::Property)
            .serialize_value(&ticket(), WireShape::PropertyBag)
            .unwrap();
        assert_eq!(value["properties"][0], json!({"property": "hs_pipeline", "value": "0"}));
    }

    #[test]
    fn flat_text_omits_unset_fields() {
        let text = EntitySerializer::new()
            .serialize(&ticket(), WireShape::Flat)
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({"id": 42, "hs_pipeline": "0", "subject": "Subject A"})
        );
        assert!(!text.contains("null"));
    }

    #[test]
    fn property_bag_round_trip_restores_id_from_envelope() {
        let serializer = EntitySerializer::new();
        let mut response: Value = serializer
            .serialize_value(&ticket(), WireShape::PropertyBag)
            .unwrap();
        response["id"] = json!("42");
        let restored: Ticket = serializer
            .deserialize(&response.to_string(), WireShape::PropertyBag)
            .unwrap();
        assert_eq!(restored.meta.id, Some(42));
        assert_eq!(restored.subject.as_deref(), Some("Subject A"));
    }

    #[test]
    fn flat_round_trip() {
        let original = Ticket {
            created: Utc.with_ymd_and_hms(2022, 1, 24, 15, 30, 0).single(),
            owner_id: Some(77),
            ..ticket()
        };
        let serializer = EntitySerializer::new();
        let text = serializer.serialize(&original, WireShape::Flat).unwrap();
        let restored: Ticket = serializer.deserialize(&text, WireShape::Flat).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn malformed_json_keeps_body() {
        let err = EntitySerializer::new()
            .deserialize::<Ticket>("<html>502</html>", WireShape::PropertyBag)
            .unwrap_err();
        match err {
            ApiError::MalformedResponse { body, .. } => assert_eq!(body, "<html>502</html>"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn page_of_property_bag_entities() {
        let body = json!({
            "results": [
                {"id": "1", "properties": {"subject": "A"}},
                {"id": "2", "properties": {"subject": "B"}}
            ],
            "paging": {"next": {"after": "2"}}
        })
        .to_string();
        let page: Page<Ticket> = EntitySerializer::new()
            .deserialize_page(&body, ListShape::Cursor, WireShape::PropertyBag)
            .unwrap();
        let subjects: Vec<_> = page.results.iter().map(|t| t.subject.as_deref()).collect();
        assert_eq!(subjects, [Some("A"), Some("B")]);
        assert_eq!(page.next_page(), Some(&Continuation::After("2".to_string())));
    }

    #[test]
    fn unreadable_flat_page_element_is_dropped() {
        let body = r#"{"results":[{"toObjectId":"not a number"},{"toObjectId":7},"stray"],"hasMore":false}"#;
        let page = EntitySerializer::new()
            .deserialize_flat_page::<crate::types::AssociationResult>(body, ListShape::ASSOCIATIONS)
            .unwrap();
        let ids: Vec<i64> = page.results.iter().map(|r| r.to_object_id).collect();
        assert_eq!(ids, [7]);
        assert!(!page.has_more());
    }

    #[test]
    fn pipeline_page_survives_text_display_order() {
        let body = json!({"results": [
            {"id": "0", "label": "Support", "displayOrder": "2", "stages": []},
            {"id": "1", "label": "Sales", "displayOrder": 1}
        ]})
        .to_string();
        let page = EntitySerializer::new()
            .deserialize_flat_page::<crate::types::Pipeline>(&body, ListShape::Cursor)
            .unwrap();
        let orders: Vec<i32> = page.results.iter().map(|p| p.display_order).collect();
        assert_eq!(orders, [2, 1]);
    }

    #[test]
    fn flat_entity_fields_coerce_across_scalar_types() {
        let serializer = EntitySerializer::new();
        let ticket: Ticket = serializer
            .deserialize(r#"{"id":"5","hubspot_owner_id":"77","subject":12}"#, WireShape::Flat)
            .unwrap();
        assert_eq!(ticket.meta.id, Some(5));
        assert_eq!(ticket.owner_id, Some(77));
        assert_eq!(ticket.subject.as_deref(), Some("12"));

        let ticket: Ticket = serializer
            .deserialize(r#"{"hubspot_owner_id":"unassigned","subject":"S"}"#, WireShape::Flat)
            .unwrap();
        assert_eq!(ticket.owner_id, None);
        assert_eq!(ticket.subject.as_deref(), Some("S"));
    }

    #[test]
    fn flat_body_that_is_not_an_object_reads_as_empty() {
        let ticket: Ticket = EntitySerializer::new()
            .deserialize(r#"["not", "a", "ticket"]"#, WireShape::Flat)
            .unwrap();
        assert_eq!(ticket, Ticket::default());
    }

    #[test]
    fn non_object_elements_are_dropped_from_entity_pages() {
        let body = json!({"results": [
            {"id": "1", "properties": {"subject": "A"}},
            42,
            {"id": "3", "subject": "C", "hubspot_owner_id": "x"}
        ]})
        .to_string();
        let serializer = EntitySerializer::new();
        let page: Page<Ticket> = serializer
            .deserialize_page(&body, ListShape::Cursor, WireShape::PropertyBag)
            .unwrap();
        assert_eq!(page.results.len(), 2);

        let page: Page<Ticket> = serializer
            .deserialize_page(&body, ListShape::Cursor, WireShape::Flat)
            .unwrap();
        let ids: Vec<_> = page.results.iter().map(|t| t.meta.id).collect();
        assert_eq!(ids, [Some(1), Some(3)]);
        assert_eq!(page.results[1].subject.as_deref(), Some("C"));
        assert_eq!(page.results[1].owner_id, None);
    }
}
