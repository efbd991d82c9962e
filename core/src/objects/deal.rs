use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Associations, CrmObject, LegacyList, LegacyListed, ObjectType};
use crate::lenient;
use crate::metadata::{DateEncoding, FieldDescriptor, ModelSchema};
use crate::model::{Identified, ObjectMeta, PropertyModel};
use crate::paging::ListShape;
use crate::value::{FieldValue, PropertyValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    #[serde(flatten)]
    pub meta: ObjectMeta,
    #[serde(
        rename = "dealname",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub name: Option<String>,
    #[serde(
        rename = "dealstage",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub pipeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::float")]
    pub amount: Option<f64>,
    /// Sent as epoch milliseconds of the exact instant.
    #[serde(
        rename = "closedate",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub close_date: Option<DateTime<Utc>>,
    #[serde(
        rename = "dealtype",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub deal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(
        rename = "hubspot_owner_id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::integer"
    )]
    pub owner_id: Option<i64>,
    #[serde(skip)]
    pub associations: Associations,
}

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("dealname"),
    FieldDescriptor::new("dealstage"),
    FieldDescriptor::new("pipeline"),
    FieldDescriptor::new("amount"),
    FieldDescriptor::new("closedate").date(DateEncoding::EpochMillis),
    FieldDescriptor::new("dealtype"),
    FieldDescriptor::new("description"),
    FieldDescriptor::new("hubspot_owner_id"),
];

impl PropertyModel for Deal {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| ModelSchema::new("deal", FIELDS))
    }

    fn read_field(&self, wire_name: &str) -> Option<FieldValue> {
        match wire_name {
            "dealname" => self.name.clone().map(Into::into),
            "dealstage" => self.stage.clone().map(Into::into),
            "pipeline" => self.pipeline.clone().map(Into::into),
            "amount" => self.amount.map(Into::into),
            "closedate" => self.close_date.map(Into::into),
            "dealtype" => self.deal_type.clone().map(Into::into),
            "description" => self.description.clone().map(Into::into),
            "hubspot_owner_id" => self.owner_id.map(Into::into),
            _ => None,
        }
    }

    fn write_field(&mut self, wire_name: &str, value: PropertyValue) {
        match wire_name {
            "dealname" => self.name = Some(value.into_text()),
            "dealstage" => self.stage = Some(value.into_text()),
            "pipeline" => self.pipeline = Some(value.into_text()),
            "amount" => self.amount = value.to_f64(),
            "closedate" => self.close_date = value.to_timestamp(),
            "dealtype" => self.deal_type = Some(value.into_text()),
            "description" => self.description = Some(value.into_text()),
            "hubspot_owner_id" => self.owner_id = value.to_i64(),
            _ => {}
        }
    }
}

impl Identified for Deal {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl CrmObject for Deal {
    const OBJECT_TYPE: ObjectType = ObjectType::Deal;

    fn associations(&self) -> &Associations {
        &self.associations
    }

    fn associations_mut(&mut self) -> &mut Associations {
        &mut self.associations
    }
}

impl LegacyListed for Deal {
    const LEGACY_LIST: LegacyList = LegacyList {
        path: &["deals", "v1", "deal", "paged"],
        limit_param: "limit",
        offset_param: "offset",
        property_param: "properties",
        envelope: ListShape::DEALS,
    };
}

#[cfg(test)]
pub(super) mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::codec;
    use crate::pairs::KeyValuePair;

    pub(in crate::objects) fn populated() -> Deal {
        Deal {
            meta: ObjectMeta::with_id(20),
            name: Some("Big deal".to_string()),
            stage: Some("appointmentscheduled".to_string()),
            pipeline: Some("default".to_string()),
            amount: Some(1500.0),
            close_date: Utc.with_ymd_and_hms(2022, 1, 24, 0, 0, 0).single(),
            deal_type: Some("newbusiness".to_string()),
            description: Some("Two hundred anvils".to_string()),
            owner_id: Some(5),
            associations: Associations::default(),
        }
    }

    #[test]
    fn close_date_is_epoch_millis() {
        let bag = codec::flatten(&populated());
        assert_eq!(bag.get("closedate"), Some(&"1642982400000".into()));
        assert_eq!(bag.get("amount"), Some(&"1500".into()));
    }

    #[test]
    fn close_date_hydrates_from_millis_or_rfc3339() {
        let mut deal = Deal::default();
        codec::hydrate(&mut deal, vec![KeyValuePair::new("closedate", "1642982400000")]);
        assert_eq!(deal.close_date, Utc.with_ymd_and_hms(2022, 1, 24, 0, 0, 0).single());

        codec::hydrate(
            &mut deal,
            vec![KeyValuePair::new("closedate", "2022-01-24T12:00:00.000Z")],
        );
        assert_eq!(deal.close_date, Utc.with_ymd_and_hms(2022, 1, 24, 12, 0, 0).single());
    }
}
