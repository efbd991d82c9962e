//! Property codec: typed model to ordered pairs and back.
//!
//! `flatten` walks the model's descriptor table in declaration order and
//! renders every set field. `hydrate` assigns inbound pairs by wire name.
//! Neither direction fails: unset fields produce no pair, and pairs with no
//! matching descriptor are dropped.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::debug;

use crate::metadata::{DateEncoding, FieldDescriptor, FieldKind};
use crate::model::PropertyModel;
use crate::pairs::{KeyValuePair, PropertyBag};
use crate::value::{midnight_utc, FieldValue, PropertyValue, DATE_FORMAT};

/// Renders every set, participating field of `model` as pairs.
///
/// Pair-splice fields contribute their own pairs in place; every other field
/// contributes at most one pair.
pub fn flatten<M: PropertyModel>(model: &M) -> PropertyBag {
    let mut bag = PropertyBag::new();
    for field in M::schema().participating() {
        let Some(value) = model.read_field(field.wire_name()) else {
            continue;
        };
        match (field.kind(), value) {
            (FieldKind::PairSplice, FieldValue::Pairs(pairs)) => bag.extend(pairs),
            (FieldKind::Complex, value) => bag.push(KeyValuePair {
                key: field.wire_name().to_string(),
                value: PropertyValue::Json(into_json(value, field)),
            }),
            (_, value) => bag.push(KeyValuePair::new(field.wire_name(), render(value, field))),
        }
    }
    bag
}

/// Assigns each pair to the field with the same wire name. Later pairs
/// overwrite earlier ones; unmatched pairs are dropped.
pub fn hydrate<M, I>(model: &mut M, pairs: I)
where
    M: PropertyModel,
    I: IntoIterator<Item = KeyValuePair>,
{
    let schema = M::schema();
    for pair in pairs {
        match schema.lookup(&pair.key) {
            Some(field) if field.accepts_pair() => model.write_field(field.wire_name(), pair.value),
            _ => debug!(model = schema.name(), key = %pair.key, "dropping unmapped property"),
        }
    }
}

/// Stringifies a scalar value according to the field's encoding rules.
pub fn render(value: FieldValue, field: &FieldDescriptor) -> String {
    match value {
        FieldValue::Text(s) => s,
        FieldValue::Integer(n) => n.to_string(),
        FieldValue::Float(n) => n.to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::Date(date) => render_date(date, field.date_encoding()),
        FieldValue::Timestamp(instant) => render_timestamp(instant, field.date_encoding()),
        FieldValue::Json(Value::String(s)) => s,
        FieldValue::Json(v) => v.to_string(),
        FieldValue::Pairs(pairs) => {
            debug!(wire_name = field.wire_name(), "pairs on a non-splice field, rendering as JSON");
            PropertyBag::from_iter(pairs).to_json(Default::default()).to_string()
        }
    }
}

fn render_date(date: NaiveDate, encoding: DateEncoding) -> String {
    match encoding {
        DateEncoding::None => date.format(DATE_FORMAT).to_string(),
        DateEncoding::EpochMillis | DateEncoding::EpochDateOnly => {
            midnight_utc(date).timestamp_millis().to_string()
        }
    }
}

fn render_timestamp(instant: DateTime<Utc>, encoding: DateEncoding) -> String {
    match encoding {
        DateEncoding::None => instant.format(DATE_FORMAT).to_string(),
        DateEncoding::EpochMillis => instant.timestamp_millis().to_string(),
        DateEncoding::EpochDateOnly => midnight_utc(instant.date_naive())
            .timestamp_millis()
            .to_string(),
    }
}

fn into_json(value: FieldValue, field: &FieldDescriptor) -> Value {
    match value {
        FieldValue::Json(v) => v,
        FieldValue::Integer(n) => Value::from(n),
        FieldValue::Float(n) => Value::from(n),
        FieldValue::Bool(b) => Value::Bool(b),
        other => Value::String(render(other, field)),
    }
}
