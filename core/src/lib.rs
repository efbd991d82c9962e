//! Synchronous client core for a CRM's REST API.
//!
//! # Overview
//! The interesting part is the property-bag layer: converting typed models
//! to and from the vendor's two wire shapes, a flat JSON object and a
//! `properties` envelope of key-value pairs. Everything above it (request
//! building, paging, associations) is plumbing that uses it. The core never
//! touches the network: it builds `HttpRequest` values and parses
//! `HttpResponse` values (host-does-IO), and walks multi-page lists through
//! a caller-supplied `Transport`.
//!
//! # Design
//! Layers, leaf first:
//! - `metadata`: static `FieldDescriptor` tables per model.
//! - `codec`: `flatten` a model into ordered pairs, `hydrate` it back.
//! - `shape` and `paging`: the `Flat`/`PropertyBag` entity shapes and the
//!   cursor/offset list envelopes.
//! - `serializer`: `EntitySerializer`, the text-level entry points.
//! - `client`: `HubSpotClient`, per-endpoint `build_*`/`parse_*` pairs.
//!
//! Nothing is global. Schemas are built once per model type behind a
//! `OnceLock` and are read-only afterwards, so every type here can be shared
//! across threads.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
mod lenient;
pub mod metadata;
pub mod model;
pub mod objects;
pub mod paging;
pub mod pairs;
pub mod serializer;
pub mod shape;
pub mod types;
pub mod value;

pub use client::HubSpotClient;
pub use config::{Auth, ClientConfig};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use metadata::{DateEncoding, FieldDescriptor, ModelSchema};
pub use model::{Entity, Identified, ObjectMeta, PropertyModel};
pub use objects::{
    Associations, Company, Contact, CrmObject, Deal, LegacyList, LegacyListed, ObjectType, Ticket,
};
pub use paging::{Continuation, ListShape, Page};
pub use pairs::{KeyValuePair, PairStyle, PropertyBag};
pub use serializer::EntitySerializer;
pub use shape::WireShape;
pub use types::{
    AssociationResult, AssociationSpec, ContactUpsert, Filter, FilterGroup, FilterOperator,
    LegacyListOptions, ListOptions, Pipeline, PropertyDefinition, SearchRequest, Sort,
    SortDirection,
};
pub use value::{FieldValue, PropertyValue};
