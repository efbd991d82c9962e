//! Key-value pairs and the property bag that holds them.
//!
//! # Design
//! The vendor spells the same pair three ways depending on the endpoint:
//! `{name, value}` in create/update bodies, `{property, value}` in legacy
//! contact payloads and `{label, value}` in picklist options. Inside the crate
//! there is one `KeyValuePair`; `PairStyle` only matters at the JSON edge.
//!
//! Inbound parsing is tolerant. A `properties` container may be an array of
//! pair objects in any of the three spellings, or a v3 map whose entries are
//! either bare values or `{"value": ...}` wrappers. An object with keys
//! beyond the wrapper's own is a structured value and is kept whole.
//! Anything else reads as an empty bag.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::value::PropertyValue;

/// Wire field that carries the key of a pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PairStyle {
    /// `{"name": .., "value": ..}`, used by create and update bodies.
    #[default]
    Name,
    /// `{"property": .., "value": ..}`, used by legacy contact endpoints.
    Property,
    /// `{"label": .., "value": ..}`, used by picklist options.
    Label,
}

impl PairStyle {
    pub fn key_field(self) -> &'static str {
        match self {
            PairStyle::Name => "name",
            PairStyle::Property => "property",
            PairStyle::Label => "label",
        }
    }
}

const KEY_FIELDS: [&str; 3] = ["name", "property", "label"];
const VALUE_FIELD: &str = "value";
/// Keys the vendor puts next to `value` in a v3 wrapper object.
const WRAPPER_FIELDS: [&str; 4] = [VALUE_FIELD, "versions", "timestamp", "source"];

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: PropertyValue,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: PropertyValue::Text(value.into()),
        }
    }

    /// A pair whose value is emitted as nested JSON rather than a string.
    pub fn complex(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value: PropertyValue::Json(value),
        }
    }

    pub fn to_json(&self, style: PairStyle) -> Value {
        let mut object = Map::with_capacity(2);
        object.insert(style.key_field().to_string(), Value::String(self.key.clone()));
        object.insert(VALUE_FIELD.to_string(), self.value.to_json());
        Value::Object(object)
    }

    /// Reads one pair object in any of the three spellings.
    fn from_json_object(object: &Map<String, Value>) -> Option<Self> {
        let key = KEY_FIELDS
            .iter()
            .find_map(|field| object.get(*field).and_then(Value::as_str));
        let Some(key) = key else {
            debug!(?object, "skipping pair without a key field");
            return None;
        };
        let value = PropertyValue::from_json(object.get(VALUE_FIELD).cloned()?)?;
        Some(Self {
            key: key.to_string(),
            value,
        })
    }
}

/// An ordered sequence of pairs. Order is preserved; keys are not
/// de-duplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    pairs: Vec<KeyValuePair>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pair: KeyValuePair) {
        self.pairs.push(pair);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyValuePair> {
        self.pairs.iter()
    }

    /// The value of the last pair named `key`.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.pairs
            .iter()
            .rev()
            .find(|pair| pair.key == key)
            .map(|pair| &pair.value)
    }

    pub fn into_vec(self) -> Vec<KeyValuePair> {
        self.pairs
    }

    /// Renders the bag as a JSON array of pair objects.
    pub fn to_json(&self, style: PairStyle) -> Value {
        Value::Array(self.pairs.iter().map(|p| p.to_json(style)).collect())
    }

    /// Reads a `properties` container. Never fails: an unrecognised container
    /// yields an empty bag.
    pub fn from_json(container: &Value) -> Self {
        match container {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(object) => KeyValuePair::from_json_object(object),
                    other => {
                        debug!(item = %other, "skipping non-object pair");
                        None
                    }
                })
                .collect(),
            Value::Object(map) => map
                .iter()
                .filter_map(|(key, entry)| {
                    let raw = match entry {
                        Value::Object(wrapper) if is_value_wrapper(wrapper) => {
                            wrapper[VALUE_FIELD].clone()
                        }
                        other => other.clone(),
                    };
                    PropertyValue::from_json(raw).map(|value| KeyValuePair {
                        key: key.clone(),
                        value,
                    })
                })
                .collect(),
            Value::Null => Self::default(),
            other => {
                warn!(container = %other, "unrecognised properties container, reading as empty");
                Self::default()
            }
        }
    }
}

/// A `{"value": ..}` wrapper carries nothing but the value and its history.
/// Any other key means the object is the value itself.
fn is_value_wrapper(object: &Map<String, Value>) -> bool {
    object.contains_key(VALUE_FIELD)
        && object.keys().all(|key| WRAPPER_FIELDS.contains(&key.as_str()))
}

impl FromIterator<KeyValuePair> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = KeyValuePair>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl Extend<KeyValuePair> for PropertyBag {
    fn extend<I: IntoIterator<Item = KeyValuePair>>(&mut self, iter: I) {
        self.pairs.extend(iter);
    }
}

impl IntoIterator for PropertyBag {
    type Item = KeyValuePair;
    type IntoIter = std::vec::IntoIter<KeyValuePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

impl<'a> IntoIterator for &'a PropertyBag {
    type Item = &'a KeyValuePair;
    type IntoIter = std::slice::Iter<'a, KeyValuePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl<'de> Deserialize<'de> for PropertyBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let container = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&container))
    }
}
