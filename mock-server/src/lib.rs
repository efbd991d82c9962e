//! In-memory stand-in for the CRM API.
//!
//! Speaks the same wire shapes as the vendor: v3 objects as property-bag
//! bodies with cursor paging, v3 search with filter groups, v4 association
//! lists with `hasMore`/`offset` paging, legacy paged lists whose envelope
//! keys differ per object type, legacy contact endpoints with
//! `{property, value}` pairs, and flat pipeline and property-definition
//! lists. State lives for the lifetime of the `Router` returned by `app()`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{debug, info};

const OBJECT_TYPES: [&str; 4] = ["companies", "contacts", "deals", "tickets"];
const DEFAULT_LIMIT: usize = 10;

/// One stored CRM object.
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub id: i64,
    pub properties: BTreeMap<String, Value>,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredObject {
    fn to_v3(&self) -> Value {
        json!({
            "id": self.id.to_string(),
            "properties": self.properties,
            "createdAt": self.created_at,
            "updatedAt": self.updated_at,
            "archived": false,
        })
    }

    /// Legacy bodies wrap every property as `{"value": .., "versions": []}`.
    fn legacy_properties(&self) -> Map<String, Value> {
        self.properties
            .iter()
            .map(|(k, v)| (k.clone(), json!({"value": v, "versions": []})))
            .collect()
    }

    fn to_legacy_contact(&self) -> Value {
        json!({
            "vid": self.id,
            "canonical-vid": self.id,
            "is-contact": true,
            "properties": self.legacy_properties(),
        })
    }

    fn to_legacy(&self, object_type: &str) -> Value {
        match object_type {
            "companies" => json!({
                "companyId": self.id,
                "isDeleted": false,
                "properties": self.legacy_properties(),
            }),
            "deals" => json!({
                "dealId": self.id,
                "isDeleted": false,
                "properties": self.legacy_properties(),
            }),
            _ => self.to_legacy_contact(),
        }
    }

    /// A property as the text the vendor compares in searches.
    fn property_text(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AssociationEdge {
    to_id: i64,
    type_id: u32,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    objects: HashMap<&'static str, BTreeMap<i64, StoredObject>>,
    /// Keyed by (from type, from id, to type).
    associations: HashMap<(&'static str, i64, &'static str), Vec<AssociationEdge>>,
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn exists(&self, object_type: &'static str, id: i64) -> bool {
        self.objects
            .get(object_type)
            .is_some_and(|objects| objects.contains_key(&id))
    }

    fn insert(&mut self, object_type: &'static str, mut properties: BTreeMap<String, Value>) -> StoredObject {
        let id = self.allocate_id();
        properties.insert("hs_object_id".to_string(), Value::String(id.to_string()));
        let now = now();
        let object = StoredObject {
            id,
            properties,
            created_at: now.clone(),
            updated_at: now,
        };
        self.objects
            .entry(object_type)
            .or_default()
            .insert(id, object.clone());
        object
    }

    fn contact_by_email(&self, email: &str) -> Option<&StoredObject> {
        self.objects
            .get("contacts")?
            .values()
            .find(|contact| contact.property_text("email").as_deref() == Some(email))
    }

    fn remove(&mut self, object_type: &'static str, id: i64) -> Option<StoredObject> {
        let removed = self.objects.get_mut(object_type)?.remove(&id)?;
        self.associations
            .retain(|(from_type, from_id, _), _| !(*from_type == object_type && *from_id == id));
        for ((_, _, to_type), edges) in self.associations.iter_mut() {
            if *to_type == object_type {
                edges.retain(|edge| edge.to_id != id);
            }
        }
        Some(removed)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/crm/v3/objects/{object_type}", get(list_objects).post(create_object))
        .route("/crm/v3/objects/{object_type}/search", post(search_objects))
        .route(
            "/crm/v3/objects/{object_type}/{id}",
            get(get_object).patch(update_object).delete(delete_object),
        )
        .route(
            "/crm/v4/objects/{object_type}/{id}/associations/{to_type}",
            get(list_associations),
        )
        .route(
            "/crm/v4/objects/{object_type}/{id}/associations/{to_type}/{to_id}",
            put(create_association).delete(delete_association),
        )
        .route("/crm/v3/pipelines/{object_type}", get(list_pipelines))
        .route("/crm/v3/properties/{object_type}", get(list_properties))
        .route("/contacts/v1/contact", post(create_legacy_contact))
        .route("/contacts/v1/contact/vid/{id}/profile", post(update_legacy_contact))
        .route("/contacts/v1/contact/email/{email}/profile", get(get_contact_by_email))
        .route(
            "/contacts/v1/contact/createOrUpdate/email/{email}",
            post(create_or_update_contact),
        )
        .route("/companies/v2/companies/paged", get(list_legacy_companies))
        .route("/deals/v1/deal/paged", get(list_legacy_deals))
        .route("/contacts/v1/lists/all/contacts/all", get(list_legacy_contacts))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// An error body in the vendor's format.
#[derive(Debug)]
pub struct MockError {
    status: StatusCode,
    category: &'static str,
    message: String,
}

impl MockError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            category: "OBJECT_NOT_FOUND",
            message: message.into(),
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            category: "VALIDATION_ERROR",
            message: message.into(),
        }
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            category: "CONFLICT",
            message: message.into(),
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let body = json!({
            "status": "error",
            "message": self.message,
            "category": self.category,
        });
        (self.status, Json(body)).into_response()
    }
}

type MockResult<T> = Result<T, MockError>;

/// Accepts plural or singular object type names.
fn object_type(raw: &str) -> MockResult<&'static str> {
    OBJECT_TYPES
        .iter()
        .find(|t| **t == raw || t.strip_suffix('s') == Some(raw) || (**t == "companies" && raw == "company"))
        .copied()
        .ok_or_else(|| MockError::validation(format!("unknown object type {raw}")))
}

fn parse_id(raw: &str) -> MockResult<i64> {
    raw.parse()
        .map_err(|_| MockError::validation(format!("invalid id {raw}")))
}

/// Reads a `properties` container: an array of pairs keyed by `name` or
/// `property`, or a plain map.
fn read_properties(body: &Value) -> MockResult<BTreeMap<String, Value>> {
    match body.get("properties") {
        Some(Value::Array(pairs)) => pairs
            .iter()
            .map(|pair| {
                let key = pair
                    .get("name")
                    .or_else(|| pair.get("property"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| MockError::validation("property pair without a name"))?;
                Ok((key.to_string(), pair.get("value").cloned().unwrap_or(Value::Null)))
            })
            .collect(),
        Some(Value::Object(map)) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        _ => Err(MockError::validation("body has no properties")),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    limit: Option<usize>,
    after: Option<String>,
    offset: Option<usize>,
    properties: Option<String>,
}

async fn list_objects(
    State(db): State<Db>,
    Path(raw_type): Path<String>,
    Query(params): Query<ListParams>,
) -> MockResult<Json<Value>> {
    let object_type = object_type(&raw_type)?;
    let after = params.after.as_deref().map(parse_id).transpose()?.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let wanted: Option<Vec<&str>> = params.properties.as_deref().map(|p| p.split(',').collect());

    let store = db.read().await;
    let mut remaining = store
        .objects
        .get(object_type)
        .into_iter()
        .flat_map(|objects| objects.range(after + 1..))
        .map(|(_, object)| object);
    let page: Vec<&StoredObject> = remaining.by_ref().take(limit).collect();
    let has_more = remaining.next().is_some();

    let results: Vec<Value> = page
        .iter()
        .map(|object| {
            let mut body = object.to_v3();
            if let Some(wanted) = &wanted {
                body["properties"] = object
                    .properties
                    .iter()
                    .filter(|(k, _)| wanted.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Map<String, Value>>()
                    .into();
            }
            body
        })
        .collect();
    let mut envelope = json!({ "results": results });
    if let (true, Some(last)) = (has_more, page.last()) {
        envelope["paging"] = json!({"next": {"after": last.id.to_string()}});
    }
    debug!(object_type, count = page.len(), has_more, "listed objects");
    Ok(Json(envelope))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFilter {
    property_name: String,
    operator: String,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    values: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchFilterGroup {
    #[serde(default)]
    filters: Vec<SearchFilter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSort {
    property_name: String,
    #[serde(default)]
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    #[serde(default)]
    filter_groups: Vec<SearchFilterGroup>,
    #[serde(default)]
    sorts: Vec<SearchSort>,
    #[serde(default)]
    properties: Vec<String>,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    after: Option<String>,
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric when both sides parse, text otherwise.
fn compare(left: &str, right: &str) -> std::cmp::Ordering {
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.total_cmp(&r),
        _ => left.cmp(right),
    }
}

fn filter_matches(object: &StoredObject, filter: &SearchFilter) -> MockResult<bool> {
    let actual = object.property_text(&filter.property_name);
    let expected = filter.value.as_ref().map(scalar_text);
    let candidates: Vec<String> = filter.values.iter().map(scalar_text).collect();
    let ordered = |accept: fn(std::cmp::Ordering) -> bool| match (&actual, &expected) {
        (Some(a), Some(e)) => accept(compare(a, e)),
        _ => false,
    };
    Ok(match filter.operator.as_str() {
        "EQ" => actual.is_some() && actual == expected,
        "NEQ" => actual != expected,
        "LT" => ordered(|o| o.is_lt()),
        "LTE" => ordered(|o| o.is_le()),
        "GT" => ordered(|o| o.is_gt()),
        "GTE" => ordered(|o| o.is_ge()),
        "IN" => actual.as_ref().is_some_and(|a| candidates.contains(a)),
        "NOT_IN" => !actual.as_ref().is_some_and(|a| candidates.contains(a)),
        "HAS_PROPERTY" => actual.is_some(),
        "NOT_HAS_PROPERTY" => actual.is_none(),
        "CONTAINS_TOKEN" => match (&actual, &expected) {
            (Some(a), Some(e)) => a.to_lowercase().contains(&e.trim_matches('*').to_lowercase()),
            _ => false,
        },
        other => return Err(MockError::validation(format!("unsupported operator {other}"))),
    })
}

/// Groups are alternatives; filters inside a group must all hold. No groups
/// matches everything.
fn search_matches(object: &StoredObject, body: &SearchBody) -> MockResult<bool> {
    if let Some(query) = body.query.as_deref().filter(|q| !q.is_empty()) {
        let query = query.to_lowercase();
        let hit = object
            .properties
            .values()
            .any(|v| scalar_text(v).to_lowercase().contains(&query));
        if !hit {
            return Ok(false);
        }
    }
    if body.filter_groups.is_empty() {
        return Ok(true);
    }
    for group in &body.filter_groups {
        let mut all = true;
        for filter in &group.filters {
            all &= filter_matches(object, filter)?;
        }
        if all {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn search_objects(
    State(db): State<Db>,
    Path(raw_type): Path<String>,
    Json(body): Json<SearchBody>,
) -> MockResult<Json<Value>> {
    let object_type = object_type(&raw_type)?;
    let after = body.after.as_deref().map(parse_id).transpose()?.unwrap_or(0).max(0) as usize;
    let limit = body.limit.unwrap_or(DEFAULT_LIMIT).max(1);

    let store = db.read().await;
    let mut matched = Vec::new();
    for object in store.objects.get(object_type).into_iter().flat_map(|o| o.values()) {
        if search_matches(object, &body)? {
            matched.push(object);
        }
    }
    if let Some(sort) = body.sorts.first() {
        let descending = sort.direction.as_deref() == Some("DESCENDING");
        matched.sort_by(|a, b| {
            let a = a.property_text(&sort.property_name).unwrap_or_default();
            let b = b.property_text(&sort.property_name).unwrap_or_default();
            let order = compare(&a, &b);
            if descending {
                order.reverse()
            } else {
                order
            }
        });
    }

    let total = matched.len();
    let results: Vec<Value> = matched
        .iter()
        .skip(after)
        .take(limit)
        .map(|object| {
            let mut found = object.to_v3();
            if !body.properties.is_empty() {
                found["properties"] = object
                    .properties
                    .iter()
                    .filter(|(k, _)| body.properties.contains(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Map<String, Value>>()
                    .into();
            }
            found
        })
        .collect();
    let next = after + results.len();
    let mut envelope = json!({ "total": total, "results": results });
    if next < total {
        envelope["paging"] = json!({"next": {"after": next.to_string()}});
    }
    debug!(object_type, total, "searched objects");
    Ok(Json(envelope))
}

/// Page size, offset and repeated property names of a legacy list query.
/// Each object type spells them differently.
fn legacy_query(params: &[(String, String)]) -> (usize, i64, Vec<String>) {
    let mut limit = DEFAULT_LIMIT;
    let mut offset = 0;
    let mut properties = Vec::new();
    for (name, value) in params {
        match name.as_str() {
            "count" | "limit" => limit = value.parse().unwrap_or(DEFAULT_LIMIT).max(1),
            "offset" | "vidOffset" => offset = value.parse().unwrap_or(0),
            "properties" | "property" => properties.push(value.clone()),
            _ => {}
        }
    }
    (limit, offset, properties)
}

async fn list_legacy(
    db: Db,
    object_type: &'static str,
    params: Vec<(String, String)>,
    keys: (&str, &str, &str),
) -> Json<Value> {
    let (items_key, has_more_key, offset_key) = keys;
    let (limit, offset, properties) = legacy_query(&params);

    let store = db.read().await;
    let mut remaining = store
        .objects
        .get(object_type)
        .into_iter()
        .flat_map(|objects| objects.range(offset + 1..))
        .map(|(_, object)| object);
    let page: Vec<&StoredObject> = remaining.by_ref().take(limit).collect();
    let has_more = remaining.next().is_some();

    let items: Vec<Value> = page
        .iter()
        .map(|object| {
            let mut item = object.to_legacy(object_type);
            if !properties.is_empty() {
                if let Some(props) = item["properties"].as_object_mut() {
                    props.retain(|k, _| properties.contains(k));
                }
            }
            item
        })
        .collect();
    let last = page.last().map_or(offset, |object| object.id);
    debug!(object_type, count = items.len(), has_more, "listed legacy page");
    Json(json!({ items_key: items, has_more_key: has_more, offset_key: last }))
}

async fn list_legacy_companies(
    State(db): State<Db>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    list_legacy(db, "companies", params, ("companies", "has-more", "offset")).await
}

async fn list_legacy_deals(
    State(db): State<Db>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    list_legacy(db, "deals", params, ("deals", "hasMore", "offset")).await
}

async fn list_legacy_contacts(
    State(db): State<Db>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    list_legacy(db, "contacts", params, ("contacts", "has-more", "vid-offset")).await
}

async fn create_object(
    State(db): State<Db>,
    Path(raw_type): Path<String>,
    Json(body): Json<Value>,
) -> MockResult<(StatusCode, Json<Value>)> {
    let object_type = object_type(&raw_type)?;
    let properties = read_properties(&body)?;
    let object = db.write().await.insert(object_type, properties);
    info!(object_type, id = object.id, "created object");
    Ok((StatusCode::CREATED, Json(object.to_v3())))
}

async fn get_object(
    State(db): State<Db>,
    Path((raw_type, raw_id)): Path<(String, String)>,
) -> MockResult<Json<Value>> {
    let object_type = object_type(&raw_type)?;
    let id = parse_id(&raw_id)?;
    let store = db.read().await;
    store
        .objects
        .get(object_type)
        .and_then(|objects| objects.get(&id))
        .map(|object| Json(object.to_v3()))
        .ok_or_else(|| MockError::not_found(format!("{object_type} {id} does not exist")))
}

async fn update_object(
    State(db): State<Db>,
    Path((raw_type, raw_id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> MockResult<Json<Value>> {
    let object_type = object_type(&raw_type)?;
    let id = parse_id(&raw_id)?;
    let properties = read_properties(&body)?;
    let mut store = db.write().await;
    let object = store
        .objects
        .get_mut(object_type)
        .and_then(|objects| objects.get_mut(&id))
        .ok_or_else(|| MockError::not_found(format!("{object_type} {id} does not exist")))?;
    object.properties.extend(properties);
    object.updated_at = now();
    info!(object_type, id, "updated object");
    Ok(Json(object.to_v3()))
}

async fn delete_object(
    State(db): State<Db>,
    Path((raw_type, raw_id)): Path<(String, String)>,
) -> MockResult<StatusCode> {
    let object_type = object_type(&raw_type)?;
    let id = parse_id(&raw_id)?;
    db.write()
        .await
        .remove(object_type, id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| MockError::not_found(format!("{object_type} {id} does not exist")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssociationSpec {
    association_category: String,
    association_type_id: u32,
}

async fn create_association(
    State(db): State<Db>,
    Path((raw_type, raw_id, raw_to_type, raw_to_id)): Path<(String, String, String, String)>,
    Json(specs): Json<Vec<AssociationSpec>>,
) -> MockResult<Json<Value>> {
    let from_type = object_type(&raw_type)?;
    let to_type = object_type(&raw_to_type)?;
    let (from_id, to_id) = (parse_id(&raw_id)?, parse_id(&raw_to_id)?);
    let spec = specs
        .first()
        .ok_or_else(|| MockError::validation("at least one association type is required"))?;
    if spec.association_category != "HUBSPOT_DEFINED" && spec.association_category != "USER_DEFINED" {
        return Err(MockError::validation(format!(
            "unknown association category {}",
            spec.association_category
        )));
    }

    let mut store = db.write().await;
    if !store.exists(from_type, from_id) {
        return Err(MockError::not_found(format!("{from_type} {from_id} does not exist")));
    }
    if !store.exists(to_type, to_id) {
        return Err(MockError::not_found(format!("{to_type} {to_id} does not exist")));
    }
    let edge = AssociationEdge {
        to_id,
        type_id: spec.association_type_id,
    };
    let edges = store
        .associations
        .entry((from_type, from_id, to_type))
        .or_default();
    if !edges.contains(&edge) {
        edges.push(edge);
    }
    info!(from_type, from_id, to_type, to_id, "associated objects");
    Ok(Json(json!({
        "fromObjectTypeId": from_type,
        "fromObjectId": from_id,
        "toObjectTypeId": to_type,
        "toObjectId": to_id,
        "labels": [],
    })))
}

async fn delete_association(
    State(db): State<Db>,
    Path((raw_type, raw_id, raw_to_type, raw_to_id)): Path<(String, String, String, String)>,
) -> MockResult<StatusCode> {
    let from_type = object_type(&raw_type)?;
    let to_type = object_type(&raw_to_type)?;
    let (from_id, to_id) = (parse_id(&raw_id)?, parse_id(&raw_to_id)?);
    let mut store = db.write().await;
    if let Some(edges) = store.associations.get_mut(&(from_type, from_id, to_type)) {
        edges.retain(|edge| edge.to_id != to_id);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_associations(
    State(db): State<Db>,
    Path((raw_type, raw_id, raw_to_type)): Path<(String, String, String)>,
    Query(params): Query<ListParams>,
) -> MockResult<Json<Value>> {
    let from_type = object_type(&raw_type)?;
    let to_type = object_type(&raw_to_type)?;
    let from_id = parse_id(&raw_id)?;
    let offset = params.offset.unwrap_or(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).max(1);

    let store = db.read().await;
    if !store.exists(from_type, from_id) {
        return Err(MockError::not_found(format!("{from_type} {from_id} does not exist")));
    }
    let edges = store
        .associations
        .get(&(from_type, from_id, to_type))
        .map(Vec::as_slice)
        .unwrap_or_default();
    let results: Vec<Value> = edges
        .iter()
        .skip(offset)
        .take(limit)
        .map(|edge| {
            json!({
                "toObjectId": edge.to_id,
                "associationTypes": [
                    {"category": "HUBSPOT_DEFINED", "typeId": edge.type_id, "label": null}
                ],
            })
        })
        .collect();
    let next = offset + results.len();
    let mut envelope = json!({ "results": results, "hasMore": next < edges.len() });
    if next < edges.len() {
        envelope["offset"] = json!(next);
    }
    Ok(Json(envelope))
}

async fn list_pipelines(Path(raw_type): Path<String>) -> MockResult<Json<Value>> {
    let object_type = object_type(&raw_type)?;
    let pipeline = match object_type {
        "tickets" => json!({
            "id": "0",
            "label": "Support Pipeline",
            "displayOrder": 0,
            "archived": false,
            "stages": [
                {"id": "1", "label": "New", "displayOrder": 0, "archived": false, "metadata": {"ticketState": "OPEN"}},
                {"id": "4", "label": "Closed", "displayOrder": 3, "archived": false, "metadata": {"ticketState": "CLOSED"}}
            ],
            "createdAt": "2022-01-24T10:00:00.000Z",
            "updatedAt": "2022-01-24T10:00:00.000Z"
        }),
        "deals" => json!({
            "id": "default",
            "label": "Sales Pipeline",
            "displayOrder": 0,
            "archived": false,
            "stages": [
                {"id": "appointmentscheduled", "label": "Appointment Scheduled", "displayOrder": 0, "metadata": {"probability": "0.2"}},
                {"id": "closedwon", "label": "Closed Won", "displayOrder": 5, "metadata": {"probability": "1.0"}}
            ]
        }),
        _ => return Ok(Json(json!({ "results": [] }))),
    };
    Ok(Json(json!({ "results": [pipeline] })))
}

async fn list_properties(Path(raw_type): Path<String>) -> MockResult<Json<Value>> {
    let object_type = object_type(&raw_type)?;
    let mut results = vec![json!({
        "name": "hubspot_owner_id",
        "label": "Owner",
        "type": "enumeration",
        "fieldType": "select",
        "groupName": "information",
        "options": []
    })];
    match object_type {
        "tickets" => results.push(json!({
            "name": "hs_ticket_priority",
            "label": "Priority",
            "type": "enumeration",
            "fieldType": "select",
            "groupName": "ticketinformation",
            "options": [
                {"label": "Low", "value": "LOW", "displayOrder": 0, "hidden": false},
                {"label": "Medium", "value": "MEDIUM", "displayOrder": 1, "hidden": false},
                {"label": "High", "value": "HIGH", "displayOrder": 2, "hidden": false}
            ]
        })),
        "deals" => results.push(json!({
            "name": "closedate",
            "label": "Close Date",
            "type": "datetime",
            "fieldType": "date",
            "groupName": "dealinformation",
            "options": []
        })),
        _ => {}
    }
    Ok(Json(json!({ "results": results })))
}

async fn create_legacy_contact(
    State(db): State<Db>,
    Json(body): Json<Value>,
) -> MockResult<Json<Value>> {
    let properties = read_properties(&body)?;
    let mut store = db.write().await;
    if let Some(email) = properties.get("email") {
        let taken = store
            .objects
            .get("contacts")
            .is_some_and(|contacts| contacts.values().any(|c| c.properties.get("email") == Some(email)));
        if taken {
            return Err(MockError::conflict("Contact already exists"));
        }
    }
    let contact = store.insert("contacts", properties);
    info!(id = contact.id, "created legacy contact");
    Ok(Json(contact.to_legacy_contact()))
}

async fn update_legacy_contact(
    State(db): State<Db>,
    Path(raw_id): Path<String>,
    Json(body): Json<Value>,
) -> MockResult<StatusCode> {
    let id = parse_id(&raw_id)?;
    let properties = read_properties(&body)?;
    let mut store = db.write().await;
    let contact = store
        .objects
        .get_mut("contacts")
        .and_then(|contacts| contacts.get_mut(&id))
        .ok_or_else(|| MockError::not_found(format!("contact {id} does not exist")))?;
    contact.properties.extend(properties);
    contact.updated_at = now();
    Ok(StatusCode::NO_CONTENT)
}

async fn get_contact_by_email(
    State(db): State<Db>,
    Path(email): Path<String>,
) -> MockResult<Json<Value>> {
    let store = db.read().await;
    store
        .contact_by_email(&email)
        .map(|contact| Json(contact.to_legacy_contact()))
        .ok_or_else(|| MockError::not_found(format!("contact {email} does not exist")))
}

async fn create_or_update_contact(
    State(db): State<Db>,
    Path(email): Path<String>,
    Json(body): Json<Value>,
) -> MockResult<Json<Value>> {
    let mut properties = read_properties(&body)?;
    let mut store = db.write().await;
    let existing = store.objects.get_mut("contacts").and_then(|contacts| {
        contacts
            .values_mut()
            .find(|contact| contact.property_text("email").as_deref() == Some(email.as_str()))
    });
    if let Some(contact) = existing {
        contact.properties.extend(properties);
        contact.updated_at = now();
        info!(id = contact.id, "updated contact by email");
        return Ok(Json(json!({"vid": contact.id, "isNew": false})));
    }
    properties
        .entry("email".to_string())
        .or_insert_with(|| Value::String(email.clone()));
    let contact = store.insert("contacts", properties);
    info!(id = contact.id, "created contact by email");
    Ok(Json(json!({"vid": contact.id, "isNew": true})))
}
