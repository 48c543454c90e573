//! Client and batch configuration.

use std::time::Duration;

/// Provider base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.avisaapp.com.br/api/v2";

/// Ceiling for the decoded size of inline document/image payloads.
pub const MAX_PAYLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Timeout for document, image and media sends.
pub const PAYLOAD_TIMEOUT: Duration = Duration::from_millis(300_000);

/// Timeout for every other call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Knobs for request building.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub default_timeout: Duration,
    pub payload_timeout: Duration,
    pub max_payload_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            payload_timeout: PAYLOAD_TIMEOUT,
            max_payload_bytes: MAX_PAYLOAD_BYTES,
        }
    }
}

/// Per-batch policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Record `{error}` for a failing item and keep going instead of aborting.
    pub continue_on_failure: bool,
}

impl BatchOptions {
    pub fn continue_on_failure() -> Self {
        Self {
            continue_on_failure: true,
        }
    }
}
