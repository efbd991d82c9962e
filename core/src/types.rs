//! Flat DTOs: association payloads, pipelines, property definitions, search
//! bodies and list options.
//!
//! # Design
//! These endpoints already speak plain JSON, so the types are serde derives
//! with the vendor's camelCase names and nothing else. They are defined
//! independently of the mock server; integration tests catch drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::pairs::PropertyBag;

/// Who defined an association label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssociationCategory {
    #[default]
    HubspotDefined,
    UserDefined,
    IntegratorDefined,
}

/// One element of the body of an association PUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationSpec {
    pub association_category: AssociationCategory,
    pub association_type_id: u32,
}

impl AssociationSpec {
    pub fn hubspot_defined(association_type_id: u32) -> Self {
        Self {
            association_category: AssociationCategory::HubspotDefined,
            association_type_id,
        }
    }
}

/// A label attached to one association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationType {
    pub category: AssociationCategory,
    pub type_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One associated object in an association list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationResult {
    pub to_object_id: i64,
    #[serde(default)]
    pub association_types: Vec<AssociationType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub id: String,
    pub label: String,
    #[serde(default, deserialize_with = "lenient::integer_or_default")]
    pub display_order: i32,
    #[serde(default, deserialize_with = "lenient::boolean_or_default")]
    pub archived: bool,
    /// Stage metadata such as `probability` or `ticketState`, all strings.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: String,
    pub label: String,
    #[serde(default, deserialize_with = "lenient::integer_or_default")]
    pub display_order: i32,
    #[serde(default, deserialize_with = "lenient::boolean_or_default")]
    pub archived: bool,
    #[serde(default)]
    pub stages: Vec<PipelineStage>,
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
}

/// Definition of one property of an object type.
///
/// `options` holds picklist entries as `{label, value}` pairs keyed by
/// label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub field_type: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: PropertyBag,
    #[serde(default)]
    pub hidden: bool,
}

/// Options for v3 list calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: u32,
    pub after: Option<String>,
    /// Property names to return. Empty means the vendor's defaults.
    pub properties: Vec<String>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            after: None,
            properties: Vec::new(),
        }
    }
}

/// Options for legacy paged lists, which page by a numeric offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyListOptions {
    pub limit: u32,
    pub offset: Option<i64>,
    pub properties: Vec<String>,
}

impl Default for LegacyListOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: None,
            properties: Vec::new(),
        }
    }
}

/// Comparison applied by one search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Between,
    In,
    NotIn,
    HasProperty,
    NotHasProperty,
    ContainsToken,
    NotContainsToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub property_name: String,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Upper bound for `Between`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_value: Option<String>,
    /// Candidates for `In` and `NotIn`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(property_name: impl Into<String>, operator: FilterOperator) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value: None,
            high_value: None,
            values: Vec::new(),
        }
    }

    pub fn eq(property_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(property_name, FilterOperator::Eq).with_value(value)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Filters that must all match. Groups in one request are alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

impl FilterGroup {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub property_name: String,
    pub direction: SortDirection,
}

/// Body of a v3 object search. It is written with
/// `EntitySerializer::serialize_flat`, which leaves unset `query` and `after`
/// out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub filter_groups: Vec<FilterGroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
    /// Free-text match over the object type's default searchable properties.
    #[serde(default)]
    pub query: Option<String>,
    pub limit: u32,
    #[serde(default)]
    pub after: Option<String>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            filter_groups: Vec::new(),
            sorts: Vec::new(),
            properties: Vec::new(),
            query: None,
            limit: 10,
            after: None,
        }
    }
}

impl SearchRequest {
    /// A search whose single group requires every filter in `filters`.
    pub fn matching_all(filters: Vec<Filter>) -> Self {
        Self {
            filter_groups: vec![FilterGroup::new(filters)],
            ..Self::default()
        }
    }

    pub fn sorted_by(mut self, property_name: impl Into<String>, direction: SortDirection) -> Self {
        self.sorts.push(Sort {
            property_name: property_name.into(),
            direction,
        });
        self
    }
}

/// Answer of the legacy contact create-or-update endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpsert {
    #[serde(default, deserialize_with = "lenient::integer")]
    pub vid: Option<i64>,
    #[serde(default, deserialize_with = "lenient::boolean_or_default")]
    pub is_new: bool,
}
