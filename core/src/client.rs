//! Request builder and response interpreter for the Avisa App API.
//!
//! # Design
//! `AvisaClient` holds the normalized base URL, the precomputed
//! `Authorization` header and the timeouts. It never touches the network:
//! `build` turns a typed `OperationRequest` into an `HttpRequest`, and
//! `interpret` turns whatever the transport produced into a `ResultRecord`
//! or a fatal `AvisaError`.
//!
//! The provider overloads HTTP 400. On the number-check endpoint it means
//! "not a WhatsApp number" and the body is the lookup result; everywhere else
//! it is a rejected request. `interpret` disambiguates by operation, never by
//! status code alone.

use serde_json::Value;
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::error::{AvisaError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::operation::OperationKey;
use crate::params::ItemParameters;
use crate::record::ResultRecord;
use crate::types::OperationRequest;

/// Characters of a base64 payload kept in request-body diagnostics.
const LOGGED_PAYLOAD_CHARS: usize = 50;

/// Stateless client bound to one set of credentials.
#[derive(Debug, Clone)]
pub struct AvisaClient {
    base_url: String,
    authorization: String,
    config: ClientConfig,
}

impl AvisaClient {
    pub fn new(credentials: &Credentials) -> Self {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: &Credentials, config: ClientConfig) -> Self {
        Self {
            base_url: credentials.normalized_base_url().to_string(),
            authorization: credentials.authorization(),
            config,
        }
    }

    /// Resolve one item's parameters and build its request.
    pub fn build_item(
        &self,
        key: OperationKey,
        params: &ItemParameters,
    ) -> Result<HttpRequest, AvisaError> {
        let request = OperationRequest::from_params(key, params)?;
        self.build(&request)
    }

    /// Build the request descriptor for a typed item.
    ///
    /// Inline document and image payloads are size-checked here, so an
    /// oversized item fails before any network call.
    pub fn build(&self, request: &OperationRequest) -> Result<HttpRequest, AvisaError> {
        let key = request.key();
        if let Some((field, payload)) = request.inline_payload() {
            check_payload_size(field, payload, self.config.max_payload_bytes)?;
        }

        let endpoint = key.endpoint();
        let url = format!("{}{}", self.base_url, endpoint.path);

        let mut headers = vec![("Authorization".to_string(), self.authorization.clone())];
        match key {
            OperationKey::GetQr => {
                headers.push(("Accept".to_string(), "application/json".to_string()));
            }
            _ => headers.push(("Content-Type".to_string(), "application/json".to_string())),
        }

        let body = request
            .body()
            .map_err(|e| AvisaError::Serialization(e.to_string()))?;
        if let Some(body) = &body {
            trace!(operation = %key, body = %redact_payloads(body), "request body");
        }

        let timeout = if key.carries_payload() {
            self.config.payload_timeout
        } else {
            self.config.default_timeout
        };

        debug!(operation = %key, method = endpoint.method.as_str(), url = %url, "built request");
        Ok(HttpRequest {
            method: endpoint.method,
            url,
            headers,
            body: body.map(|b| b.to_string()),
            timeout,
        })
    }

    /// Normalize a transport outcome into a record.
    ///
    /// Returns `Err` only for failures that are fatal for the item; soft
    /// provider errors and negative number lookups come back as records.
    pub fn interpret(
        &self,
        key: OperationKey,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<ResultRecord, AvisaError> {
        match key {
            OperationKey::CheckNumber => Ok(interpret_number_lookup(outcome)),
            OperationKey::SendText
            | OperationKey::SendDocument
            | OperationKey::SendImage
            | OperationKey::SendMedia
            | OperationKey::CheckStatus
            | OperationKey::GetQr => interpret_delivery(key, outcome),
        }
    }
}

/// Send and instance operations: body passes through, 400/401 are soft
/// failures, anything else is fatal.
fn interpret_delivery(
    key: OperationKey,
    outcome: Result<HttpResponse, TransportError>,
) -> Result<ResultRecord, AvisaError> {
    match outcome {
        Ok(response) => Ok(ResultRecord::from_body(parse_body(&response.body))),
        Err(err) => match err.status() {
            Some(status @ (400 | 401)) => {
                let message = provider_message(&err);
                warn!(operation = %key, status, error = %message, "provider rejected request");
                Ok(ResultRecord::soft_failure(message))
            }
            _ => Err(AvisaError::Transport(err)),
        },
    }
}

/// Number check: every outcome is a record. A 400 is a negative lookup.
fn interpret_number_lookup(outcome: Result<HttpResponse, TransportError>) -> ResultRecord {
    match outcome {
        Ok(response) => {
            let mut record = ResultRecord::new()
                .with("success", true)
                .with("isWhatsAppNumber", true);
            record.merge(parse_body(&response.body));
            record
        }
        Err(TransportError::Status { status: 400, body }) => {
            info!(body = %body, "number is not on WhatsApp");
            let mut record = ResultRecord::new()
                .with("success", true)
                .with("isWhatsAppNumber", false)
                .with("statusCode", 400);
            record.merge(parse_body(&body));
            record
        }
        Err(err) => {
            warn!(error = %err, "number check failed");
            let mut record = ResultRecord::new()
                .with("success", false)
                .with("isWhatsAppNumber", false)
                .with("error", err.to_string());
            if let Some(body) = err.body() {
                record.merge(parse_body(body));
            }
            record
        }
    }
}

/// JSON if it parses, the raw text otherwise, `Null` when empty.
fn parse_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}

/// `body.message`, then `body.error`, then the transport error's own text.
fn provider_message(err: &TransportError) -> String {
    let body = err.body().map(parse_body).unwrap_or(Value::Null);
    ["message", "error"]
        .into_iter()
        .find_map(|field| body.get(field).and_then(non_empty_text))
        .unwrap_or_else(|| err.to_string())
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn check_payload_size(field: &'static str, payload: &str, limit: usize) -> Result<(), AvisaError> {
    let size = decoded_len(payload);
    if size > limit {
        warn!(field, size, limit, "payload rejected before sending");
        return Err(AvisaError::PayloadTooLarge { field, size, limit });
    }
    Ok(())
}

/// Decoded byte length of base64 text without materializing it. A
/// `data:<mime>;base64,` prefix is skipped; only standard and URL-safe
/// alphabet symbols count.
fn decoded_len(payload: &str) -> usize {
    let data = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    let symbols = data
        .bytes()
        .filter(|b| b.is_ascii_alphanumeric() || matches!(*b, b'+' | b'/' | b'-' | b'_'))
        .count();
    symbols * 3 / 4
}

/// Copy of a request body with base64 payloads shortened for logging.
fn redact_payloads(body: &Value) -> Value {
    let mut body = body.clone();
    for field in ["document", "image"] {
        if let Some(Value::String(payload)) = body.get_mut(field) {
            if payload.chars().count() > LOGGED_PAYLOAD_CHARS {
                let head: String = payload.chars().take(LOGGED_PAYLOAD_CHARS).collect();
                *payload = format!("{head}... [content truncated]");
            }
        }
    }
    body
}
