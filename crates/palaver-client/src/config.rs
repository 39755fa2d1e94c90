//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local development server.

use palaver_net::ReconnectPolicy;
use palaver_shared::constants::{
    DEFAULT_API_BASE, DEFAULT_PAGE_SIZE, DEFAULT_WS_FALLBACK_URL, DEFAULT_WS_URL,
};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API.
    /// Env: `API_BASE_URL`
    /// Default: `http://localhost:5000/api`
    pub api_base: String,

    /// Primary realtime endpoint.
    /// Env: `WS_URL`
    /// Default: `ws://localhost:5000/chathub`
    pub ws_url: String,

    /// Fallback realtime endpoint, tried when the primary fails.
    /// Env: `WS_FALLBACK_URL`
    /// Default: `ws://localhost:5001/chathub`
    pub ws_fallback_url: String,

    /// Message history page size.
    /// Env: `PAGE_SIZE`
    /// Default: `50`
    pub page_size: u32,

    /// Reconnect backoff policy for the realtime channel.
    pub reconnect: ReconnectPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            ws_fallback_url: DEFAULT_WS_FALLBACK_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("API_BASE_URL") {
            config.api_base = url;
        }

        if let Ok(url) = std::env::var("WS_URL") {
            config.ws_url = url;
        }

        if let Ok(url) = std::env::var("WS_FALLBACK_URL") {
            config.ws_fallback_url = url;
        }

        if let Ok(val) = std::env::var("PAGE_SIZE") {
            if let Ok(n) = val.parse::<u32>() {
                config.page_size = n;
            } else {
                tracing::warn!(value = %val, "Invalid PAGE_SIZE, using default");
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.reconnect.max_attempts > 0);
    }
}
