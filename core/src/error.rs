//! Error types for the Avisa dispatch core.
//!
//! # Design
//! `TransportError` is what a transport raises: either the provider answered
//! with a non-2xx status (kept with its raw body, since some operations
//! treat that body as data), or the call never completed. `AvisaError` is
//! the per-item error surfaced by building or interpreting a request.
//! `BatchError` adds the failing item index on top.

use thiserror::Error;

use crate::http::HttpResponse;

/// A failed transport round-trip.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The provider answered with a non-2xx status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: String },

    /// The per-call timeout elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS, TLS or body-read failure.
    #[error("network error: {0}")]
    Network(String),
}

impl TransportError {
    /// Split a raw response into the success/error outcome a `Transport`
    /// must return: 2xx passes through, anything else becomes `Status`.
    pub fn from_response(response: HttpResponse) -> Result<HttpResponse, TransportError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status {
                status: response.status,
                body: response.body,
            })
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body, when the provider sent one.
    pub fn body(&self) -> Option<&str> {
        match self {
            TransportError::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Errors produced while building, executing or interpreting one item.
#[derive(Debug, Error)]
pub enum AvisaError {
    /// A required parameter is missing or has the wrong type.
    #[error("invalid parameter `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// The `(resource, operation)` pair is not part of the provider API.
    #[error("unknown operation `{operation}` for resource `{resource}`")]
    UnknownOperation { resource: String, operation: String },

    /// A base64 payload decodes to more bytes than the configured ceiling.
    #[error("{field} size ({size} bytes) exceeds {limit} byte limit")]
    PayloadTooLarge {
        field: &'static str,
        size: usize,
        limit: usize,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Credentials are missing or unusable.
    #[error("invalid credentials: {0}")]
    Credentials(String),
}

impl AvisaError {
    pub(crate) fn missing(field: &str) -> Self {
        AvisaError::Validation {
            field: field.to_string(),
            reason: "required parameter is missing".to_string(),
        }
    }

    pub(crate) fn wrong_type(field: &str, expected: &str) -> Self {
        AvisaError::Validation {
            field: field.to_string(),
            reason: format!("expected {expected}"),
        }
    }
}

/// A batch that stopped before producing every record.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to resolve credentials: {0}")]
    Credentials(#[source] AvisaError),

    #[error("item {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: AvisaError,
    },
}

impl BatchError {
    /// Index of the failing item, if the failure belongs to one.
    pub fn index(&self) -> Option<usize> {
        match self {
            BatchError::Credentials(_) => None,
            BatchError::Item { index, .. } => Some(*index),
        }
    }
}
