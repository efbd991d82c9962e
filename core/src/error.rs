//! Error types for the HubSpot client core.
//!
//! # Design
//! `NotFound` gets a dedicated variant because get-by-id callers turn a 404
//! into `None`. All other non-2xx responses land in `Vendor` with the raw
//! status code and body. The codec itself almost never fails: unknown keys
//! are dropped and a missing `properties` container reads as empty, so the
//! only decoding error is a body that is not usable JSON.

use thiserror::Error;

/// Errors returned by the serializer, the request builders and the
/// response parsers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The vendor returned 404.
    #[error("resource not found")]
    NotFound,

    /// The vendor returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Vendor { status: u16, body: String },

    /// The response body could not be parsed. `body` is the raw text.
    #[error("malformed response ({reason}): {body}")]
    MalformedResponse { reason: String, body: String },

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// An operation on an existing object was given an entity without an id.
    #[error("{0} entity must have an id set")]
    MissingId(&'static str),

    /// No vendor-defined association type exists between the two object
    /// types.
    #[error("no default association type from {from} to {to}")]
    UnsupportedAssociation { from: &'static str, to: &'static str },

    /// The configured base URL cannot carry API paths.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),

    /// The transport failed before a response was produced.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    pub(crate) fn malformed(reason: impl ToString, body: &str) -> Self {
        ApiError::MalformedResponse {
            reason: reason.to_string(),
            body: body.to_string(),
        }
    }
}

/// A specialized `Result` type for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
