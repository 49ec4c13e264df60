//! Environment-driven client configuration.

use std::time::Duration;

use crate::DEFAULT_BASE_URL;

/// Settings for connecting to the Vartiq API.
#[derive(Clone)]
pub struct ClientConfig {
    /// API key sent in the `x-api-key` header.
    pub api_key: String,
    /// API base URL (e.g. `https://api.us.vartiq.com`).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration for the production API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `VARTIQ_API_KEY` (empty if unset; rejected when building a client)
    /// - `VARTIQ_API_URL` (optional, defaults to the production host)
    /// - `VARTIQ_TIMEOUT_SECS` (optional, default 30)
    pub fn from_env() -> Self {
        let api_key = std::env::var("VARTIQ_API_KEY").unwrap_or_default();
        let base_url = std::env::var("VARTIQ_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout = std::env::var("VARTIQ_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);

        Self {
            api_key,
            base_url,
            timeout,
        }
    }

    /// Override the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Override the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_production_host() {
        let config = ClientConfig::new("key");
        assert_eq!(config.base_url, "https://api.us.vartiq.com");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn overrides_apply() {
        let config = ClientConfig::new("key")
            .with_base_url("http://localhost:3000")
            .with_api_key("other")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.api_key, "other");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", ClientConfig::new("super-secret-key"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-key"));
    }
}
