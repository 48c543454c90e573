//! Executing requests.
//!
//! `Transport` is the seam between the dispatch core and the network. The
//! batch executor only ever holds one call in flight, so implementations do
//! not need to be re-entrant, but they must be `Send + Sync` to live across
//! `.await` points.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{AvisaError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one round-trip. Non-2xx responses must come back as
    /// `TransportError::Status` carrying the raw body.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport. Timeouts are applied per request from the
/// descriptor.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, AvisaError> {
        let client = Client::builder()
            .user_agent(concat!("avisa-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AvisaError::Transport(TransportError::Network(e.to_string())))?;
        Ok(Self { client })
    }

    /// Reuse an existing client (connection pool, proxy settings, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;
        debug!(url = %request.url, status, "response received");

        TransportError::from_response(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}
