//! Process-wide gateway URL cache
//!
//! URL discovery is shared across every session in the process: one lock,
//! one in-flight discovery request, one cached URL reused for the duration
//! the server advertised. Discovery failure falls back to the configured
//! default URL so a REST outage cannot keep the gateway down.

use botway_common::ClientConfig;
use botway_http::Rest;
use std::sync::OnceLock;
use std::time::Instant;
use tokio::sync::Mutex;

static CACHE: OnceLock<Mutex<CachedUrl>> = OnceLock::new();

#[derive(Debug, Default)]
struct CachedUrl {
    url: Option<String>,
    /// Absent means the cached URL never expires
    expires_at: Option<Instant>,
}

impl CachedUrl {
    fn fresh(&self) -> Option<&str> {
        let url = self.url.as_deref()?;
        match self.expires_at {
            Some(expires_at) if Instant::now() >= expires_at => None,
            _ => Some(url),
        }
    }
}

/// Resolve the gateway URL to connect to, decorated with protocol version
/// and encoding query parameters.
///
/// Holding the cache lock across the discovery request is what guarantees a
/// single discovery in flight per process.
pub(crate) async fn gateway_url(rest: &Rest, config: &ClientConfig) -> String {
    let cache = CACHE.get_or_init(Mutex::default);
    let mut guard = cache.lock().await;

    if let Some(url) = guard.fresh() {
        return decorate(url, config);
    }

    match rest.get_gateway().await {
        Ok(info) => {
            guard.url = Some(info.url.clone());
            guard.expires_at = info.max_age.map(|age| Instant::now() + age);
            tracing::debug!(url = %info.url, max_age = ?info.max_age, "Gateway URL discovered");
            decorate(&info.url, config)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Gateway URL discovery failed, using configured default");
            decorate(&config.gateway.default_url, config)
        }
    }
}

fn decorate(url: &str, config: &ClientConfig) -> String {
    format!(
        "{}?v={}&encoding=json",
        url.trim_end_matches('/'),
        config.gateway.version
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use botway_core::Intents;

    #[test]
    fn test_decorate_appends_version_and_encoding() {
        let config = ClientConfig::new("token", Intents::default()).unwrap();
        assert_eq!(
            decorate("wss://gateway.example", &config),
            "wss://gateway.example?v=1&encoding=json"
        );
        assert_eq!(
            decorate("wss://gateway.example/", &config),
            "wss://gateway.example?v=1&encoding=json"
        );
    }

    #[test]
    fn test_freshness() {
        let mut cached = CachedUrl::default();
        assert!(cached.fresh().is_none());

        cached.url = Some("wss://a".to_string());
        cached.expires_at = None;
        assert_eq!(cached.fresh(), Some("wss://a"));

        cached.expires_at = Some(Instant::now() - std::time::Duration::from_secs(1));
        assert!(cached.fresh().is_none());

        cached.expires_at = Some(Instant::now() + std::time::Duration::from_secs(60));
        assert_eq!(cached.fresh(), Some("wss://a"));
    }
}
