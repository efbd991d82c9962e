//! List envelopes and continuation state.
//!
//! # Design
//! Two envelope families exist. v3 endpoints return `results` plus an optional
//! `paging.next.after` cursor. Legacy endpoints return the items under an
//! endpoint-specific key next to a `hasMore` flag and an `offset`, and even
//! those two keys are spelled differently per endpoint. `ListShape` names the
//! keys; `Page` reports the outcome uniformly.
//!
//! The presence of a continuation is the only signal that more pages exist.

use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::error::Result;

/// Where the items and the continuation live in a list envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// `{"results": [...], "paging": {"next": {"after": "..."}}}`.
    Cursor,
    /// `{"<items>": [...], "<has_more>": bool, "<offset>": n}`.
    Offset {
        items: &'static str,
        has_more: &'static str,
        offset: &'static str,
    },
}

impl ListShape {
    pub const COMPANIES: ListShape = ListShape::Offset {
        items: "companies",
        has_more: "has-more",
        offset: "offset",
    };
    pub const DEALS: ListShape = ListShape::Offset {
        items: "deals",
        has_more: "hasMore",
        offset: "offset",
    };
    pub const CONTACTS: ListShape = ListShape::Offset {
        items: "contacts",
        has_more: "has-more",
        offset: "vid-offset",
    };
    pub const ASSOCIATIONS: ListShape = ListShape::Offset {
        items: "results",
        has_more: "hasMore",
        offset: "offset",
    };

    fn items_key(&self) -> &'static str {
        match self {
            ListShape::Cursor => "results",
            ListShape::Offset { items, .. } => items,
        }
    }

    /// Splits an envelope into its raw items and its continuation. A missing
    /// or non-array items entry is an empty page.
    pub fn split(&self, envelope: &Value) -> (Vec<Value>, Option<Continuation>) {
        let Some(object) = envelope.as_object() else {
            warn!("list envelope is not an object, reading as an empty last page");
            return (Vec::new(), None);
        };
        let items = match object.get(self.items_key()) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        (items, self.continuation(object))
    }

    fn continuation(&self, object: &Map<String, Value>) -> Option<Continuation> {
        match self {
            ListShape::Cursor => {
                let after = object.get("paging")?.get("next")?.get("after")?;
                match after {
                    Value::String(token) if !token.is_empty() => {
                        Some(Continuation::After(token.clone()))
                    }
                    Value::Number(n) => Some(Continuation::After(n.to_string())),
                    _ => None,
                }
            }
            ListShape::Offset {
                has_more, offset, ..
            } => {
                if !object.get(*has_more).and_then(Value::as_bool).unwrap_or(false) {
                    return None;
                }
                let offset = match object.get(*offset) {
                    Some(Value::Number(n)) => n.as_i64(),
                    Some(Value::String(s)) => s.parse().ok(),
                    _ => None,
                };
                if offset.is_none() {
                    warn!("list reports more pages but carries no usable offset");
                }
                offset.map(Continuation::Offset)
            }
        }
    }
}

/// Opaque state needed to request the next page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// v3 cursor token, sent back as `after`.
    After(String),
    /// Legacy offset, sent back as `offset` (or `vidOffset` for contacts).
    Offset(i64),
}

impl Continuation {
    /// The value to send back as a query parameter.
    pub fn token(&self) -> String {
        match self {
            Continuation::After(token) => token.clone(),
            Continuation::Offset(offset) => offset.to_string(),
        }
    }

    /// The legacy offset, if this is one.
    pub fn offset(&self) -> Option<i64> {
        match self {
            Continuation::Offset(offset) => Some(*offset),
            Continuation::After(_) => None,
        }
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub next: Option<Continuation>,
}

impl<T> Page<T> {
    pub fn last(results: Vec<T>) -> Self {
        Self {
            results,
            next: None,
        }
    }

    pub fn next_page(&self) -> Option<&Continuation> {
        self.next.as_ref()
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            results: self.results.into_iter().map(f).collect(),
            next: self.next,
        }
    }
}

/// Collects every page by calling `fetch` with the previous continuation
/// until a page carries none. Each call is independent; the first error is
/// returned unchanged. A continuation that repeats the previous one ends the
/// walk, so a misbehaving server cannot loop it forever.
pub fn fetch_all_pages<T, F>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<&Continuation>) -> Result<Page<T>>,
{
    let mut all = Vec::new();
    let mut cursor: Option<Continuation> = None;
    loop {
        let page = fetch(cursor.as_ref())?;
        trace!(items = page.results.len(), next = ?page.next, "fetched page");
        all.extend(page.results);
        match page.next {
            Some(next) if cursor.as_ref() != Some(&next) => cursor = Some(next),
            Some(next) => {
                warn!(?next, "continuation did not advance, stopping");
                return Ok(all);
            }
            None => return Ok(all),
        }
    }
}
