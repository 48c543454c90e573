//! Provider credentials and where they come from.
//!
//! # Design
//! Credential storage belongs to the host. The core only needs a
//! `CredentialProvider` it can ask once per batch; `StaticCredentials` wraps
//! values the host already resolved and `EnvCredentials` reads them from the
//! process environment.

use std::fmt;

use async_trait::async_trait;

use crate::config::DEFAULT_BASE_URL;
use crate::error::AvisaError;

pub const TOKEN_ENV: &str = "AVISA_API_TOKEN";
pub const BASE_URL_ENV: &str = "AVISA_BASE_URL";

/// API token and base URL for one batch.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_token: String,
    base_url: String,
}

impl Credentials {
    /// Fails if the token is blank or the base URL is empty.
    pub fn new(api_token: impl Into<String>, base_url: impl Into<String>) -> Result<Self, AvisaError> {
        let api_token = api_token.into();
        let base_url = base_url.into();
        if api_token.trim().is_empty() {
            return Err(AvisaError::Credentials("API token is empty".to_string()));
        }
        if base_url.trim().is_empty() {
            return Err(AvisaError::Credentials("base URL is empty".to_string()));
        }
        Ok(Self { api_token, base_url })
    }

    /// The token as stored, surrounding whitespace included.
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `Authorization` header value. The stored token is trimmed.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.api_token.trim())
    }

    /// Base URL with exactly one trailing `/` removed.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.strip_suffix('/').unwrap_or(&self.base_url)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Source of credentials, consulted once per batch.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self) -> Result<Credentials, AvisaError>;
}

/// Credentials resolved ahead of time by the host.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Credentials);

impl StaticCredentials {
    pub fn new(credentials: Credentials) -> Self {
        Self(credentials)
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn credentials(&self) -> Result<Credentials, AvisaError> {
        Ok(self.0.clone())
    }
}

/// Reads `AVISA_API_TOKEN` and `AVISA_BASE_URL` (falling back to the
/// public API URL) at the moment a batch starts.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    fn resolve(
        token: Result<String, std::env::VarError>,
        base_url: Result<String, std::env::VarError>,
    ) -> Result<Credentials, AvisaError> {
        let token = token.map_err(|_| AvisaError::Credentials(format!("{TOKEN_ENV} is not set")))?;
        let base_url = base_url.unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Credentials::new(token, base_url)
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentials {
    async fn credentials(&self) -> Result<Credentials, AvisaError> {
        Self::resolve(std::env::var(TOKEN_ENV), std::env::var(BASE_URL_ENV))
    }
}
