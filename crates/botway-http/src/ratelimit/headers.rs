//! Rate-limit response headers
//!
//! The bucket identifier and the capacity are distinct headers; `reset` is
//! an absolute UNIX epoch instant with fractional seconds.

use chrono::{DateTime, TimeZone, Utc};
use reqwest::header::HeaderMap;

/// Server-assigned bucket identifier
pub const BUCKET: &str = "x-ratelimit-bucket";
/// Advertised capacity per window
pub const LIMIT: &str = "x-ratelimit-limit";
/// Tokens left in the current window
pub const REMAINING: &str = "x-ratelimit-remaining";
/// Absolute UNIX epoch seconds (fractional) at which the window refreshes
pub const RESET: &str = "x-ratelimit-reset";

/// Parsed rate-limit headers from one response
///
/// Every field is optional; the server only sends what applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitHeaders {
    pub bucket: Option<String>,
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    pub reset: Option<DateTime<Utc>>,
}

impl RateLimitHeaders {
    /// Extract the rate-limit headers from a response header map.
    ///
    /// Unparseable values are treated as absent.
    #[must_use]
    pub fn parse(headers: &HeaderMap) -> Self {
        Self {
            bucket: header_str(headers, BUCKET).map(str::to_string),
            limit: header_str(headers, LIMIT).and_then(|v| v.parse().ok()),
            remaining: header_str(headers, REMAINING).and_then(|v| v.parse().ok()),
            reset: header_str(headers, RESET)
                .and_then(|v| v.parse::<f64>().ok())
                .and_then(epoch_seconds_to_instant),
        }
    }

    /// Check whether any rate-limit header was present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bucket.is_none()
            && self.limit.is_none()
            && self.remaining.is_none()
            && self.reset.is_none()
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn epoch_seconds_to_instant(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Utc.timestamp_millis_opt((seconds * 1000.0) as i64).single()
}
