//! HTTP transport types for the dispatch core.
//!
//! # Design
//! Requests and responses are plain data. `AvisaClient` builds `HttpRequest`
//! values and interprets `HttpResponse` values; executing the round-trip is
//! the job of a `Transport` implementation (or of the host, across the C
//! boundary). All fields are owned so values can cross FFI boundaries
//! without lifetime concerns.

use std::time::Duration;

/// HTTP method for a request. The provider API only uses GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully resolved request descriptor: absolute URL, headers, optional JSON
/// body and the per-call timeout.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
