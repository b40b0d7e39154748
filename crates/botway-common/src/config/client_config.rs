//! Client configuration
//!
//! Loads configuration from environment variables with sensible defaults.

use botway_core::Intents;
use std::env;
use std::time::Duration;

/// Main client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bot authentication token, stored without the `Bot ` scheme prefix
    pub token: String,
    /// Event-category subscription bitmask sent at identify time
    pub intents: Intents,
    pub rest: RestConfig,
    pub gateway: GatewayConfig,
}

/// REST surface configuration
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Base URL for REST requests, without trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_secs: 30,
        }
    }
}

impl RestConfig {
    /// Per-request timeout as a [`Duration`]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Gateway connection configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Fallback WebSocket URL used when URL discovery fails
    pub default_url: String,
    /// Protocol version appended to the gateway URL
    pub version: u8,
    /// Minimum spacing between outbound gateway frames, in milliseconds
    pub send_interval_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_url: default_gateway_url(),
            version: 1,
            send_interval_ms: 500,
        }
    }
}

impl GatewayConfig {
    /// Frame pacing interval as a [`Duration`]
    #[must_use]
    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }
}

impl ClientConfig {
    /// Create a configuration from a token and intents, with default endpoints.
    ///
    /// A leading `Bot ` authentication-scheme prefix on the token is stripped.
    pub fn new(token: impl Into<String>, intents: Intents) -> Result<Self, ConfigError> {
        let token = normalize_token(token.into())?;
        Ok(Self {
            token,
            intents,
            rest: RestConfig::default(),
            gateway: GatewayConfig::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// `BOTWAY_TOKEN` is required; everything else falls back to defaults:
    /// `BOTWAY_INTENTS`, `BOTWAY_API_BASE_URL`, `BOTWAY_REQUEST_TIMEOUT_SECS`,
    /// `BOTWAY_GATEWAY_URL`, `BOTWAY_GATEWAY_VERSION`,
    /// `BOTWAY_SEND_INTERVAL_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = env::var("BOTWAY_TOKEN").map_err(|_| ConfigError::MissingToken)?;
        let mut config = Self::new(token, Intents::default())?;

        if let Ok(v) = env::var("BOTWAY_INTENTS") {
            config.intents = Intents::parse(&v).map_err(|e| ConfigError::InvalidVar {
                var: "BOTWAY_INTENTS",
                reason: e.to_string(),
            })?;
        }
        if let Ok(v) = env::var("BOTWAY_API_BASE_URL") {
            config.rest.base_url = v;
        }
        if let Ok(v) = env::var("BOTWAY_REQUEST_TIMEOUT_SECS") {
            config.rest.request_timeout_secs = parse_var("BOTWAY_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Ok(v) = env::var("BOTWAY_GATEWAY_URL") {
            config.gateway.default_url = v;
        }
        if let Ok(v) = env::var("BOTWAY_GATEWAY_VERSION") {
            config.gateway.version = parse_var("BOTWAY_GATEWAY_VERSION", &v)?;
        }
        if let Ok(v) = env::var("BOTWAY_SEND_INTERVAL_MS") {
            config.gateway.send_interval_ms = parse_var("BOTWAY_SEND_INTERVAL_MS", &v)?;
        }

        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BOTWAY_TOKEN is not set")]
    MissingToken,

    #[error("Token must not be empty")]
    EmptyToken,

    #[error("Invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

fn normalize_token(raw: String) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let token = trimmed.strip_prefix("Bot ").unwrap_or(trimmed).trim_start();
    if token.is_empty() {
        return Err(ConfigError::EmptyToken);
    }
    Ok(token.to_string())
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidVar {
        var,
        reason: e.to_string(),
    })
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8080/api/v1".to_string()
}

fn default_gateway_url() -> String {
    "ws://127.0.0.1:8081/gateway".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_scheme_prefix_is_stripped() {
        let config = ClientConfig::new("Bot abc.def.ghi", Intents::default()).unwrap();
        assert_eq!(config.token, "abc.def.ghi");

        let config = ClientConfig::new("abc.def.ghi", Intents::default()).unwrap();
        assert_eq!(config.token, "abc.def.ghi");
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            ClientConfig::new("", Intents::default()),
            Err(ConfigError::EmptyToken)
        ));
        assert!(matches!(
            ClientConfig::new("Bot ", Intents::default()),
            Err(ConfigError::EmptyToken)
        ));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("token", Intents::default()).unwrap();
        assert_eq!(config.gateway.version, 1);
        assert_eq!(config.gateway.send_interval(), Duration::from_millis(500));
        assert_eq!(config.rest.request_timeout(), Duration::from_secs(30));
    }
}
