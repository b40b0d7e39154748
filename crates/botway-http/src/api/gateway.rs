//! Gateway URL discovery

use super::Rest;
use crate::error::{RestError, RestResult};
use crate::routes::Route;
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use std::time::Duration;

/// Result of gateway URL discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayInfo {
    /// WebSocket URL to connect to, without query parameters
    pub url: String,
    /// Server cache-age hint for this URL, if advertised
    pub max_age: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct GatewayBody {
    url: String,
}

impl Rest {
    /// `GET gateway` - discover the WebSocket URL to connect to.
    ///
    /// The response's `Cache-Control: max-age` hint dictates how long the
    /// URL may be reused across sessions.
    pub async fn get_gateway(&self) -> RestResult<GatewayInfo> {
        let response = self.request(Route::gateway(), None, None).await?;
        if !response.is_success() {
            return Err(RestError::UnexpectedStatus(response.status));
        }

        let body: GatewayBody = response.json()?;
        Ok(GatewayInfo {
            url: body.url,
            max_age: cache_max_age(&response.headers),
        })
    }
}

fn cache_max_age(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let value = headers.get(CACHE_CONTROL)?.to_str().ok()?;
    value
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn test_cache_max_age_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        );
        assert_eq!(cache_max_age(&headers), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_cache_max_age_absent() {
        assert_eq!(cache_max_age(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        assert_eq!(cache_max_age(&headers), None);
    }
}
