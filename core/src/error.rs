//! Error types shared across the todo crates.
//!
//! # Design
//! `ValidationError` is produced by both the server's store and the widget's
//! optimistic helpers, so it lives here. `ApiError` covers everything the
//! stateless client can observe in a response. `HostError` is what a widget
//! host reports when it cannot perform a requested capability.

use thiserror::Error;

/// Input that failed a schema or bounds check. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    /// Path of the offending input, e.g. `title` or `todos[1].id`.
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404; the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The protocol endpoint answered with a JSON-RPC error object.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Failures reported by a widget host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host did not inject the named capability.
    #[error("host capability unavailable: {0}")]
    Unavailable(&'static str),

    /// The host provides the capability but refused this call.
    #[error("host rejected call: {0}")]
    Rejected(String),
}

/// Errors surfaced by the widget's optimistic helpers.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Host(#[from] HostError),

    /// The id is not present in the local mirror.
    #[error("to-do not found: {0}")]
    NotFound(String),
}
