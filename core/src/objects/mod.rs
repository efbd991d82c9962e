//! CRM object models.
//!
//! # Design
//! Each model is a plain struct with three views that must agree on names:
//! the `const` descriptor table (property-bag shape), the serde derives (flat
//! shape), and the `read_field`/`write_field` match arms. Metadata lives in a
//! flattened `ObjectMeta`; association references live in `Associations`,
//! which is never serialized and only changes through association calls.

mod company;
mod contact;
mod deal;
mod ticket;

pub use company::Company;
pub use contact::Contact;
pub use deal::Deal;
pub use ticket::Ticket;

use crate::model::Entity;
use crate::paging::ListShape;

/// The object types the client knows routes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Company,
    Contact,
    Deal,
    Ticket,
}

impl ObjectType {
    pub const ALL: [ObjectType; 4] = [
        ObjectType::Company,
        ObjectType::Contact,
        ObjectType::Deal,
        ObjectType::Ticket,
    ];

    /// Path segment of the v3 object and metadata endpoints.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Company => "companies",
            ObjectType::Contact => "contacts",
            ObjectType::Deal => "deals",
            ObjectType::Ticket => "tickets",
        }
    }

    /// Singular name used as the target segment of association paths.
    pub fn singular(&self) -> &'static str {
        match self {
            ObjectType::Company => "company",
            ObjectType::Contact => "contact",
            ObjectType::Deal => "deal",
            ObjectType::Ticket => "ticket",
        }
    }

    /// The vendor-defined association type id from `self` to `to`.
    pub fn default_association_type(&self, to: ObjectType) -> Option<u32> {
        use ObjectType::*;
        match (self, to) {
            (Contact, Company) => Some(279),
            (Company, Contact) => Some(280),
            (Deal, Contact) => Some(3),
            (Contact, Deal) => Some(4),
            (Deal, Company) => Some(341),
            (Company, Deal) => Some(342),
            (Contact, Ticket) => Some(15),
            (Ticket, Contact) => Some(16),
            (Company, Ticket) => Some(25),
            (Ticket, Company) => Some(26),
            (Deal, Ticket) => Some(27),
            (Ticket, Deal) => Some(28),
            _ => None,
        }
    }
}

/// Ids of associated objects, one list per object type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Associations {
    companies: Vec<i64>,
    contacts: Vec<i64>,
    deals: Vec<i64>,
    tickets: Vec<i64>,
}

impl Associations {
    pub fn ids(&self, object_type: ObjectType) -> &[i64] {
        match object_type {
            ObjectType::Company => &self.companies,
            ObjectType::Contact => &self.contacts,
            ObjectType::Deal => &self.deals,
            ObjectType::Ticket => &self.tickets,
        }
    }

    fn ids_mut(&mut self, object_type: ObjectType) -> &mut Vec<i64> {
        match object_type {
            ObjectType::Company => &mut self.companies,
            ObjectType::Contact => &mut self.contacts,
            ObjectType::Deal => &mut self.deals,
            ObjectType::Ticket => &mut self.tickets,
        }
    }

    /// Records `id` unless it is already present. Other lists are untouched.
    pub fn add(&mut self, object_type: ObjectType, id: i64) {
        let ids = self.ids_mut(object_type);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub fn remove(&mut self, object_type: ObjectType, id: i64) {
        self.ids_mut(object_type).retain(|&existing| existing != id);
    }

    pub fn replace(&mut self, object_type: ObjectType, ids: Vec<i64>) {
        *self.ids_mut(object_type) = ids;
    }

    pub fn is_empty(&self) -> bool {
        ObjectType::ALL.iter().all(|&t| self.ids(t).is_empty())
    }
}

/// An entity served by the `/crm/v3/objects/{type}` family.
pub trait CrmObject: Entity {
    const OBJECT_TYPE: ObjectType;

    fn associations(&self) -> &Associations;
    fn associations_mut(&mut self) -> &mut Associations;
}

/// Route and paging parameters of a pre-v3 paged list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyList {
    pub path: &'static [&'static str],
    /// Query parameter carrying the page size.
    pub limit_param: &'static str,
    /// Query parameter carrying the continuation offset.
    pub offset_param: &'static str,
    /// Query parameter repeated once per requested property.
    pub property_param: &'static str,
    pub envelope: ListShape,
}

/// An object type that also has a legacy paged list. Tickets never had one.
pub trait LegacyListed: CrmObject {
    const LEGACY_LIST: LegacyList;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::Value;

    use super::*;
    use crate::codec;
    use crate::metadata::FieldKind;
    use crate::model::PropertyModel;
    use crate::shape::{self, WireShape};
    use crate::pairs::PairStyle;

    #[test]
    fn association_add_is_deduplicated_and_scoped() {
        let mut associations = Associations::default();
        associations.add(ObjectType::Company, 1);
        associations.add(ObjectType::Company, 1);
        associations.add(ObjectType::Contact, 2);
        assert_eq!(associations.ids(ObjectType::Company), [1]);
        assert_eq!(associations.ids(ObjectType::Contact), [2]);
        assert!(associations.ids(ObjectType::Deal).is_empty());

        associations.remove(ObjectType::Company, 1);
        associations.replace(ObjectType::Contact, Vec::new());
        assert!(associations.is_empty());
    }

    #[test]
    fn association_types_are_directional() {
        assert_eq!(ObjectType::Ticket.default_association_type(ObjectType::Company), Some(26));
        assert_eq!(ObjectType::Ticket.default_association_type(ObjectType::Contact), Some(16));
        assert_eq!(ObjectType::Ticket.default_association_type(ObjectType::Deal), Some(28));
        assert_eq!(ObjectType::Company.default_association_type(ObjectType::Ticket), Some(25));
        assert_eq!(ObjectType::Deal.default_association_type(ObjectType::Deal), None);
    }

    /// Every declared key emitted by the codec must also be a serde key, so
    /// the two wire shapes agree on names.
    fn assert_names_agree<T: CrmObject>(populated: T) {
        let declared: BTreeSet<&str> = T::schema()
            .participating()
            .filter(|f| f.kind() != FieldKind::PairSplice)
            .map(|f| f.wire_name())
            .collect();
        let emitted: BTreeSet<String> = codec::flatten(&populated)
            .into_iter()
            .map(|pair| pair.key)
            .filter(|key| declared.contains(key.as_str()))
            .collect();
        let flat = shape::entity_to_value(&populated, WireShape::Flat, PairStyle::Name).unwrap();
        let Value::Object(flat) = flat else {
            panic!("flat shape is not an object");
        };
        for key in &emitted {
            assert!(flat.contains_key(key), "{} lacks serde key {key}", T::schema().name());
        }
        assert!(!emitted.is_empty());
    }

    #[test]
    fn wire_names_agree_across_shapes() {
        assert_names_agree(company::tests::populated());
        assert_names_agree(contact::tests::populated());
        assert_names_agree(deal::tests::populated());
        assert_names_agree(ticket::tests::populated());
    }

    #[test]
    fn associations_are_never_serialized() {
        let mut deal = deal::tests::populated();
        deal.associations_mut().add(ObjectType::Company, 9);
        let flat = shape::entity_to_value(&deal, WireShape::Flat, PairStyle::Name).unwrap();
        assert!(!flat.to_string().contains("associations"));
        let bag = codec::flatten(&deal);
        assert!(bag.iter().all(|pair| !pair.key.contains("association")));
    }
}
