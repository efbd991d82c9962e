use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Associations, CrmObject, ObjectType};
use crate::lenient;
use crate::metadata::{DateEncoding, FieldDescriptor, ModelSchema};
use crate::model::{Identified, ObjectMeta, PropertyModel};
use crate::value::{FieldValue, PropertyValue};

/// A support ticket.
///
/// `hs_ticket_id` and `hs_object_id` are write-only: when a response carries
/// them they fill in the id, but they are never sent back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(flatten)]
    pub meta: ObjectMeta,
    #[serde(
        rename = "createdate",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub created: Option<DateTime<Utc>>,
    #[serde(
        rename = "hs_lastmodifieddate",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::timestamp"
    )]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(
        rename = "hs_pipeline",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub pipeline: Option<String>,
    #[serde(
        rename = "hs_pipeline_stage",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub stage: Option<String>,
    #[serde(
        rename = "hs_ticket_category",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub category: Option<String>,
    #[serde(
        rename = "hs_ticket_priority",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub priority: Option<String>,
    #[serde(
        rename = "hubspot_owner_id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::integer"
    )]
    pub owner_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub subject: Option<String>,
    #[serde(
        rename = "content",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub description: Option<String>,
    #[serde(skip)]
    pub associations: Associations,
}

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("hs_ticket_id"),
    FieldDescriptor::new("hs_object_id"),
    FieldDescriptor::new("createdate").date(DateEncoding::EpochDateOnly),
    FieldDescriptor::new("hs_lastmodifieddate").date(DateEncoding::EpochDateOnly),
    FieldDescriptor::new("hs_pipeline"),
    FieldDescriptor::new("hs_pipeline_stage"),
    FieldDescriptor::new("hs_ticket_category"),
    FieldDescriptor::new("hs_ticket_priority"),
    FieldDescriptor::new("hubspot_owner_id"),
    FieldDescriptor::new("subject"),
    FieldDescriptor::new("content"),
];

impl PropertyModel for Ticket {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| ModelSchema::new("ticket", FIELDS))
    }

    fn read_field(&self, wire_name: &str) -> Option<FieldValue> {
        match wire_name {
            "createdate" => self.created.map(Into::into),
            "hs_lastmodifieddate" => self.last_modified.map(Into::into),
            "hs_pipeline" => self.pipeline.clone().map(Into::into),
            "hs_pipeline_stage" => self.stage.clone().map(Into::into),
            "hs_ticket_category" => self.category.clone().map(Into::into),
            "hs_ticket_priority" => self.priority.clone().map(Into::into),
            "hubspot_owner_id" => self.owner_id.map(Into::into),
            "subject" => self.subject.clone().map(Into::into),
            "content" => self.description.clone().map(Into::into),
            _ => None,
        }
    }

    fn write_field(&mut self, wire_name: &str, value: PropertyValue) {
        match wire_name {
            "hs_ticket_id" | "hs_object_id" => {
                if self.meta.id.is_none() {
                    self.meta.id = value.to_i64();
                }
            }
            "createdate" => self.created = value.to_timestamp(),
            "hs_lastmodifieddate" => self.last_modified = value.to_timestamp(),
            "hs_pipeline" => self.pipeline = Some(value.into_text()),
            "hs_pipeline_stage" => self.stage = Some(value.into_text()),
            "hs_ticket_category" => self.category = Some(value.into_text()),
            "hs_ticket_priority" => self.priority = Some(value.into_text()),
            "hubspot_owner_id" => self.owner_id = value.to_i64(),
            "subject" => self.subject = Some(value.into_text()),
            "content" => self.description = Some(value.into_text()),
            _ => {}
        }
    }
}

impl Identified for Ticket {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl CrmObject for Ticket {
    const OBJECT_TYPE: ObjectType = ObjectType::Ticket;

    fn associations(&self) -> &Associations {
        &self.associations
    }

    fn associations_mut(&mut self) -> &mut Associations {
        &mut self.associations
    }
}
