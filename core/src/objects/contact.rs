use std::sync::OnceLock;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Associations, CrmObject, LegacyList, LegacyListed, ObjectType};
use crate::lenient;
use crate::metadata::{FieldDescriptor, ModelSchema};
use crate::model::{Identified, ObjectMeta, PropertyModel};
use crate::paging::ListShape;
use crate::pairs::KeyValuePair;
use crate::value::{FieldValue, PropertyValue};

/// A contact.
///
/// Portal-specific properties that have no typed field go in
/// `extra_properties`. They are spliced into the outbound pair list and only
/// travel in the property-bag shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(flatten)]
    pub meta: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub email: Option<String>,
    #[serde(
        rename = "firstname",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub first_name: Option<String>,
    #[serde(
        rename = "lastname",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub state: Option<String>,
    #[serde(
        rename = "zip",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub zip_code: Option<String>,
    #[serde(
        rename = "lifecyclestage",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::text"
    )]
    pub lifecycle_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(
        rename = "hs_email_optout",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::boolean"
    )]
    pub email_opt_out: Option<bool>,
    #[serde(skip)]
    pub extra_properties: Vec<KeyValuePair>,
    #[serde(skip)]
    pub associations: Associations,
}

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("email"),
    FieldDescriptor::new("firstname"),
    FieldDescriptor::new("lastname"),
    FieldDescriptor::new("website"),
    FieldDescriptor::new("company"),
    FieldDescriptor::new("phone"),
    FieldDescriptor::new("address"),
    FieldDescriptor::new("city"),
    FieldDescriptor::new("state"),
    FieldDescriptor::new("zip"),
    FieldDescriptor::new("lifecyclestage"),
    FieldDescriptor::new("date_of_birth"),
    FieldDescriptor::new("hs_email_optout"),
    FieldDescriptor::new("extra_properties").pairs(),
];

impl PropertyModel for Contact {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| ModelSchema::new("contact", FIELDS))
    }

    fn read_field(&self, wire_name: &str) -> Option<FieldValue> {
        match wire_name {
            "email" => self.email.clone().map(Into::into),
            "firstname" => self.first_name.clone().map(Into::into),
            "lastname" => self.last_name.clone().map(Into::into),
            "website" => self.website.clone().map(Into::into),
            "company" => self.company.clone().map(Into::into),
            "phone" => self.phone.clone().map(Into::into),
            "address" => self.address.clone().map(Into::into),
            "city" => self.city.clone().map(Into::into),
            "state" => self.state.clone().map(Into::into),
            "zip" => self.zip_code.clone().map(Into::into),
            "lifecyclestage" => self.lifecycle_stage.clone().map(Into::into),
            "date_of_birth" => self.date_of_birth.map(Into::into),
            "hs_email_optout" => self.email_opt_out.map(Into::into),
            "extra_properties" => Some(self.extra_properties.clone().into()),
            _ => None,
        }
    }

    fn write_field(&mut self, wire_name: &str, value: PropertyValue) {
        match wire_name {
            "email" => self.email = Some(value.into_text()),
            "firstname" => self.first_name = Some(value.into_text()),
            "lastname" => self.last_name = Some(value.into_text()),
            "website" => self.website = Some(value.into_text()),
            "company" => self.company = Some(value.into_text()),
            "phone" => self.phone = Some(value.into_text()),
            "address" => self.address = Some(value.into_text()),
            "city" => self.city = Some(value.into_text()),
            "state" => self.state = Some(value.into_text()),
            "zip" => self.zip_code = Some(value.into_text()),
            "lifecyclestage" => self.lifecycle_stage = Some(value.into_text()),
            "date_of_birth" => self.date_of_birth = value.to_date(),
            "hs_email_optout" => self.email_opt_out = value.to_bool(),
            _ => {}
        }
    }
}

impl Identified for Contact {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl CrmObject for Contact {
    const OBJECT_TYPE: ObjectType = ObjectType::Contact;

    fn associations(&self) -> &Associations {
        &self.associations
    }

    fn associations_mut(&mut self) -> &mut Associations {
        &mut self.associations
    }
}

impl LegacyListed for Contact {
    const LEGACY_LIST: LegacyList = LegacyList {
        path: &["contacts", "v1", "lists", "all", "contacts", "all"],
        limit_param: "count",
        offset_param: "vidOffset",
        property_param: "property",
        envelope: ListShape::CONTACTS,
    };
}
