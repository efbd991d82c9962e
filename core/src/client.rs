//! Stateless request builder and response parser for the CRM API.
//!
//! # Design
//! `HubSpotClient` holds a `ClientConfig` and an `EntitySerializer` and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; the caller executes the round-trip.
//! Operations that need several round-trips (`list_all`, `search_all`,
//! `list_all_legacy`, `get_associations`) or that update the caller's entity
//! (`associate`) take a `Transport` instead.
//!
//! Every `parse_*` runs `check_status` before touching the body, so vendor
//! errors reach the caller unchanged and the serializer only sees 2xx
//! bodies.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{check_status, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::objects::{Contact, CrmObject, LegacyListed, ObjectType};
use crate::paging::{fetch_all_pages, Continuation, ListShape, Page};
use crate::pairs::PairStyle;
use crate::serializer::EntitySerializer;
use crate::shape::WireShape;
use crate::types::{
    AssociationResult, AssociationSpec, ContactUpsert, LegacyListOptions, ListOptions, Pipeline,
    PropertyDefinition, SearchRequest,
};

/// Page size used when walking association lists.
const ASSOCIATION_PAGE_SIZE: u32 = 100;

/// Synchronous, stateless client for the CRM API.
#[derive(Debug, Clone)]
pub struct HubSpotClient {
    config: ClientConfig,
    serializer: EntitySerializer,
}

impl HubSpotClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            serializer: EntitySerializer::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn serializer(&self) -> &EntitySerializer {
        &self.serializer
    }

    fn request(
        &self,
        method: HttpMethod,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = self.config.auth_headers();
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            path: self.config.url(segments, query),
            headers,
            body,
        }
    }

    // CRM v3 objects

    pub fn build_create<T: CrmObject>(&self, entity: &T) -> Result<HttpRequest> {
        let body = self.serializer.serialize(entity, WireShape::PropertyBag)?;
        Ok(self.request(
            HttpMethod::Post,
            &["crm", "v3", "objects", T::OBJECT_TYPE.as_str()],
            &[],
            Some(body),
        ))
    }

    /// The created entity, with the id the vendor assigned. Associations are
    /// never filled from a create response.
    pub fn parse_create<T: CrmObject>(&self, response: HttpResponse) -> Result<T> {
        check_status(&response)?;
        self.serializer.deserialize(&response.body, WireShape::PropertyBag)
    }

    pub fn build_get<T: CrmObject>(&self, id: i64) -> HttpRequest {
        let id = id.to_string();
        self.request(
            HttpMethod::Get,
            &["crm", "v3", "objects", T::OBJECT_TYPE.as_str(), &id],
            &[],
            None,
        )
    }

    /// `None` when the object does not exist.
    pub fn parse_get<T: CrmObject>(&self, response: HttpResponse) -> Result<Option<T>> {
        match check_status(&response) {
            Ok(()) => self
                .serializer
                .deserialize(&response.body, WireShape::PropertyBag)
                .map(Some),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn build_update<T: CrmObject>(&self, entity: &T) -> Result<HttpRequest> {
        let id = require_id(entity)?.to_string();
        let body = self.serializer.serialize(entity, WireShape::PropertyBag)?;
        Ok(self.request(
            HttpMethod::Patch,
            &["crm", "v3", "objects", T::OBJECT_TYPE.as_str(), &id],
            &[],
            Some(body),
        ))
    }

    /// The updated entity. Association references are carried over from
    /// `sent` since an update never changes them.
    pub fn parse_update<T: CrmObject>(&self, sent: &T, response: HttpResponse) -> Result<T> {
        check_status(&response)?;
        let mut updated: T = self
            .serializer
            .deserialize(&response.body, WireShape::PropertyBag)?;
        *updated.associations_mut() = sent.associations().clone();
        Ok(updated)
    }

    pub fn build_delete<T: CrmObject>(&self, id: i64) -> HttpRequest {
        let id = id.to_string();
        self.request(
            HttpMethod::Delete,
            &["crm", "v3", "objects", T::OBJECT_TYPE.as_str(), &id],
            &[],
            None,
        )
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    pub fn build_list<T: CrmObject>(&self, options: &ListOptions) -> HttpRequest {
        let mut query = vec![("limit", options.limit.to_string())];
        if let Some(after) = &options.after {
            query.push(("after", after.clone()));
        }
        if !options.properties.is_empty() {
            query.push(("properties", options.properties.join(",")));
        }
        self.request(
            HttpMethod::Get,
            &["crm", "v3", "objects", T::OBJECT_TYPE.as_str()],
            &query,
            None,
        )
    }

    pub fn parse_list<T: CrmObject>(&self, response: HttpResponse) -> Result<Page<T>> {
        check_status(&response)?;
        self.serializer
            .deserialize_page(&response.body, ListShape::Cursor, WireShape::PropertyBag)
    }

    /// Every object of type `T`, following cursors from `options.after`.
    pub fn list_all<T: CrmObject>(
        &self,
        transport: &impl Transport,
        options: &ListOptions,
    ) -> Result<Vec<T>> {
        fetch_all_pages(|cursor| {
            let options = match cursor {
                Some(next) => ListOptions {
                    after: Some(next.token()),
                    ..options.clone()
                },
                None => options.clone(),
            };
            let response = transport.send(&self.build_list::<T>(&options))?;
            self.parse_list(response)
        })
    }

    /// Searches objects of type `T` with filter groups, sorts and a cursor.
    pub fn build_search<T: CrmObject>(&self, request: &SearchRequest) -> Result<HttpRequest> {
        let body = self.serializer.serialize_flat(request)?;
        Ok(self.request(
            HttpMethod::Post,
            &["crm", "v3", "objects", T::OBJECT_TYPE.as_str(), "search"],
            &[],
            Some(body),
        ))
    }

    /// One page of matches. Elements are property-bag bodies like any v3
    /// list.
    pub fn parse_search<T: CrmObject>(&self, response: HttpResponse) -> Result<Page<T>> {
        check_status(&response)?;
        self.serializer
            .deserialize_page(&response.body, ListShape::Cursor, WireShape::PropertyBag)
    }

    /// Every match of `request`, following cursors from `request.after`.
    pub fn search_all<T: CrmObject>(
        &self,
        transport: &impl Transport,
        request: &SearchRequest,
    ) -> Result<Vec<T>> {
        fetch_all_pages(|cursor| {
            let request = match cursor {
                Some(next) => SearchRequest {
                    after: Some(next.token()),
                    ..request.clone()
                },
                None => request.clone(),
            };
            let response = transport.send(&self.build_search::<T>(&request)?)?;
            self.parse_search(response)
        })
    }

    // Legacy paged lists

    pub fn build_list_legacy<T: LegacyListed>(&self, options: &LegacyListOptions) -> HttpRequest {
        let route = T::LEGACY_LIST;
        let mut query = vec![(route.limit_param, options.limit.to_string())];
        if let Some(offset) = options.offset {
            query.push((route.offset_param, offset.to_string()));
        }
        for property in &options.properties {
            query.push((route.property_param, property.clone()));
        }
        self.request(HttpMethod::Get, route.path, &query, None)
    }

    pub fn parse_list_legacy<T: LegacyListed>(&self, response: HttpResponse) -> Result<Page<T>> {
        check_status(&response)?;
        self.serializer.deserialize_page(
            &response.body,
            T::LEGACY_LIST.envelope,
            WireShape::PropertyBag,
        )
    }

    /// Every object of type `T` from its legacy list, following offsets from
    /// `options.offset`.
    pub fn list_all_legacy<T: LegacyListed>(
        &self,
        transport: &impl Transport,
        options: &LegacyListOptions,
    ) -> Result<Vec<T>> {
        fetch_all_pages(|cursor| {
            let options = LegacyListOptions {
                offset: cursor.and_then(Continuation::offset).or(options.offset),
                ..options.clone()
            };
            let response = transport.send(&self.build_list_legacy::<T>(&options))?;
            self.parse_list_legacy(response)
        })
    }

    // Legacy contacts

    /// Creates a contact through the legacy endpoint, which expects
    /// `{property, value}` pairs.
    pub fn build_create_legacy_contact(&self, contact: &Contact) -> Result<HttpRequest> {
        let body = EntitySerializer::with_pair_style(PairStyle::Property)
            .serialize(contact, WireShape::PropertyBag)?;
        Ok(self.request(
            HttpMethod::Post,
            &["contacts", "v1", "contact"],
            &[],
            Some(body),
        ))
    }

    pub fn parse_create_legacy_contact(&self, response: HttpResponse) -> Result<Contact> {
        check_status(&response)?;
        self.serializer
            .deserialize(&response.body, WireShape::PropertyBag)
    }

    pub fn build_update_legacy_contact(&self, contact: &Contact) -> Result<HttpRequest> {
        let id = require_id(contact)?.to_string();
        let body = EntitySerializer::with_pair_style(PairStyle::Property)
            .serialize(contact, WireShape::PropertyBag)?;
        Ok(self.request(
            HttpMethod::Post,
            &["contacts", "v1", "contact", "vid", &id, "profile"],
            &[],
            Some(body),
        ))
    }

    /// The legacy update answers 204 without a body.
    pub fn parse_update_legacy_contact(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    pub fn build_get_contact_by_email(&self, email: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["contacts", "v1", "contact", "email", email, "profile"],
            &[],
            None,
        )
    }

    /// `None` when no contact has the email.
    pub fn parse_get_contact_by_email(&self, response: HttpResponse) -> Result<Option<Contact>> {
        self.parse_get(response)
    }

    /// Creates the contact, or updates the one currently known by
    /// `known_email`. The contact's own email may differ from it.
    pub fn build_create_or_update_contact(
        &self,
        known_email: &str,
        contact: &Contact,
    ) -> Result<HttpRequest> {
        let body = EntitySerializer::with_pair_style(PairStyle::Property)
            .serialize(contact, WireShape::PropertyBag)?;
        Ok(self.request(
            HttpMethod::Post,
            &["contacts", "v1", "contact", "createOrUpdate", "email", known_email],
            &[],
            Some(body),
        ))
    }

    /// The endpoint only answers with the contact's id, so the result is
    /// `sent` with that id filled in.
    pub fn parse_create_or_update_contact(
        &self,
        sent: &Contact,
        response: HttpResponse,
    ) -> Result<Contact> {
        check_status(&response)?;
        let upsert: ContactUpsert = self.serializer.deserialize_flat(&response.body)?;
        debug!(vid = ?upsert.vid, is_new = upsert.is_new, "contact created or updated");
        let mut contact = sent.clone();
        if upsert.vid.is_some() {
            contact.meta.id = upsert.vid;
        }
        Ok(contact)
    }

    // Associations (v4)

    pub fn build_associate<T: CrmObject>(
        &self,
        entity: &T,
        to: ObjectType,
        to_id: i64,
        spec: &AssociationSpec,
    ) -> Result<HttpRequest> {
        let id = require_id(entity)?.to_string();
        let to_id = to_id.to_string();
        let body = self.serializer.serialize_flat(std::slice::from_ref(spec))?;
        Ok(self.request(
            HttpMethod::Put,
            &[
                "crm",
                "v4",
                "objects",
                T::OBJECT_TYPE.as_str(),
                &id,
                "associations",
                to.singular(),
                &to_id,
            ],
            &[],
            Some(body),
        ))
    }

    /// Records `to_id` on `entity` once the vendor has accepted the
    /// association. No other reference list is touched.
    pub fn parse_associate<T: CrmObject>(
        &self,
        entity: &mut T,
        to: ObjectType,
        to_id: i64,
        response: HttpResponse,
    ) -> Result<()> {
        check_status(&response)?;
        entity.associations_mut().add(to, to_id);
        Ok(())
    }

    /// Associates `entity` with `to_id` using the vendor-defined type for the
    /// pair of object types.
    pub fn associate<T: CrmObject>(
        &self,
        transport: &impl Transport,
        entity: &mut T,
        to: ObjectType,
        to_id: i64,
    ) -> Result<()> {
        let type_id = T::OBJECT_TYPE
            .default_association_type(to)
            .ok_or(ApiError::UnsupportedAssociation {
                from: T::OBJECT_TYPE.singular(),
                to: to.singular(),
            })?;
        let request =
            self.build_associate(entity, to, to_id, &AssociationSpec::hubspot_defined(type_id))?;
        let response = transport.send(&request)?;
        self.parse_associate(entity, to, to_id, response)
    }

    pub fn build_delete_association<T: CrmObject>(
        &self,
        id: i64,
        to: ObjectType,
        to_id: i64,
    ) -> HttpRequest {
        let id = id.to_string();
        let to_id = to_id.to_string();
        self.request(
            HttpMethod::Delete,
            &[
                "crm",
                "v4",
                "objects",
                T::OBJECT_TYPE.as_str(),
                &id,
                "associations",
                to.singular(),
                &to_id,
            ],
            &[],
            None,
        )
    }

    pub fn parse_delete_association(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    pub fn build_list_associations<T: CrmObject>(
        &self,
        id: i64,
        to: ObjectType,
        cursor: Option<&Continuation>,
    ) -> HttpRequest {
        let id = id.to_string();
        let mut query = vec![("limit", ASSOCIATION_PAGE_SIZE.to_string())];
        match cursor {
            Some(Continuation::Offset(offset)) => query.push(("offset", offset.to_string())),
            Some(Continuation::After(after)) => query.push(("after", after.clone())),
            None => {}
        }
        self.request(
            HttpMethod::Get,
            &[
                "crm",
                "v4",
                "objects",
                T::OBJECT_TYPE.as_str(),
                &id,
                "associations",
                to.singular(),
            ],
            &query,
            None,
        )
    }

    pub fn parse_list_associations(&self, response: HttpResponse) -> Result<Page<AssociationResult>> {
        check_status(&response)?;
        self.serializer
            .deserialize_flat_page(&response.body, ListShape::ASSOCIATIONS)
    }

    /// Replaces every association list of `entity` with the full set the
    /// vendor reports, walking all pages for each other object type.
    pub fn get_associations<T: CrmObject>(
        &self,
        transport: &impl Transport,
        entity: &mut T,
    ) -> Result<()> {
        let id = require_id(entity)?;
        for to in ObjectType::ALL {
            if to == T::OBJECT_TYPE {
                continue;
            }
            let results = fetch_all_pages(|cursor| {
                let response = transport.send(&self.build_list_associations::<T>(id, to, cursor))?;
                self.parse_list_associations(response)
            })?;
            debug!(from = T::OBJECT_TYPE.as_str(), to = to.as_str(), count = results.len(), "associations fetched");
            entity
                .associations_mut()
                .replace(to, results.into_iter().map(|r| r.to_object_id).collect());
        }
        Ok(())
    }

    // Pipelines and property definitions

    pub fn build_list_pipelines(&self, object_type: ObjectType) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["crm", "v3", "pipelines", object_type.as_str()],
            &[],
            None,
        )
    }

    pub fn parse_list_pipelines(&self, response: HttpResponse) -> Result<Vec<Pipeline>> {
        check_status(&response)?;
        let page = self
            .serializer
            .deserialize_flat_page(&response.body, ListShape::Cursor)?;
        Ok(page.results)
    }

    pub fn build_list_properties(&self, object_type: ObjectType) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &["crm", "v3", "properties", object_type.as_str()],
            &[],
            None,
        )
    }

    pub fn parse_list_properties(&self, response: HttpResponse) -> Result<Vec<PropertyDefinition>> {
        check_status(&response)?;
        let page = self
            .serializer
            .deserialize_flat_page(&response.body, ListShape::Cursor)?;
        Ok(page.results)
    }
}

/// The entity's id, which must be set and positive.
fn require_id<T: CrmObject>(entity: &T) -> Result<i64> {
    match entity.id() {
        Some(id) if id > 0 => Ok(id),
        _ => Err(ApiError::MissingId(T::schema().name())),
    }
}
