use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Associations, CrmObject, LegacyList, LegacyListed, ObjectType};
use crate::lenient;
use crate::metadata::{FieldDescriptor, ModelSchema};
use crate::model::{Identified, ObjectMeta, PropertyModel};
use crate::paging::ListShape;
use crate::value::{FieldValue, PropertyValue};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(flatten)]
    pub meta: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::text")]
    pub country: Option<String>,
    #[serde(
        rename = "numberofemployees",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::integer"
    )]
    pub employees: Option<i64>,
    #[serde(
        rename = "annualrevenue",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::float"
    )]
    pub annual_revenue: Option<f64>,
    /// Structured postal address, sent as nested JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    #[serde(skip)]
    pub associations: Associations,
}

const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("name"),
    FieldDescriptor::new("domain"),
    FieldDescriptor::new("description"),
    FieldDescriptor::new("industry"),
    FieldDescriptor::new("website"),
    FieldDescriptor::new("phone"),
    FieldDescriptor::new("city"),
    FieldDescriptor::new("country"),
    FieldDescriptor::new("numberofemployees"),
    FieldDescriptor::new("annualrevenue"),
    FieldDescriptor::new("address").complex(),
];

impl PropertyModel for Company {
    fn schema() -> &'static ModelSchema {
        static SCHEMA: OnceLock<ModelSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| ModelSchema::new("company", FIELDS))
    }

    fn read_field(&self, wire_name: &str) -> Option<FieldValue> {
        match wire_name {
            "name" => self.name.clone().map(Into::into),
            "domain" => self.domain.clone().map(Into::into),
            "description" => self.description.clone().map(Into::into),
            "industry" => self.industry.clone().map(Into::into),
            "website" => self.website.clone().map(Into::into),
            "phone" => self.phone.clone().map(Into::into),
            "city" => self.city.clone().map(Into::into),
            "country" => self.country.clone().map(Into::into),
            "numberofemployees" => self.employees.map(Into::into),
            "annualrevenue" => self.annual_revenue.map(Into::into),
            "address" => self.address.clone().map(Into::into),
            _ => None,
        }
    }

    fn write_field(&mut self, wire_name: &str, value: PropertyValue) {
        match wire_name {
            "name" => self.name = Some(value.into_text()),
            "domain" => self.domain = Some(value.into_text()),
            "description" => self.description = Some(value.into_text()),
            "industry" => self.industry = Some(value.into_text()),
            "website" => self.website = Some(value.into_text()),
            "phone" => self.phone = Some(value.into_text()),
            "city" => self.city = Some(value.into_text()),
            "country" => self.country = Some(value.into_text()),
            "numberofemployees" => self.employees = value.to_i64(),
            "annualrevenue" => self.annual_revenue = value.to_f64(),
            "address" => self.address = Some(value.to_json()),
            _ => {}
        }
    }
}

impl Identified for Company {
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
}

impl CrmObject for Company {
    const OBJECT_TYPE: ObjectType = ObjectType::Company;

    fn associations(&self) -> &Associations {
        &self.associations
    }

    fn associations_mut(&mut self) -> &mut Associations {
        &mut self.associations
    }
}

impl LegacyListed for Company {
    const LEGACY_LIST: LegacyList = LegacyList {
        path: &["companies", "v2", "companies", "paged"],
        limit_param: "count",
        offset_param: "offset",
        property_param: "properties",
        envelope: ListShape::COMPANIES,
    };
}
