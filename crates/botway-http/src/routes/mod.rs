//! Route templates
//!
//! Every REST request is described by a `(method, key, path)` triple. The
//! `key` is the route template used for rate-limit bucketing: major path
//! parameters (the owning channel or guild) stay in the key, minor ones
//! (the individual resource id) are elided, so all requests against the same
//! endpoint group share one bucket regardless of which resource they touch.

use botway_core::Snowflake;
use reqwest::Method;
use std::fmt;

/// A REST route: HTTP method, rate-limit template key, and concrete path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// HTTP method
    pub method: Method,
    /// Rate-limit template key (major parameters kept, minor ones elided)
    pub key: String,
    /// Concrete request path, relative to the API base URL
    pub path: String,
}

impl Route {
    /// Create a route from raw parts
    #[must_use]
    pub fn new(method: Method, key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            key: key.into(),
            path: path.into(),
        }
    }

    /// Key used by the bucket registry's route index
    #[must_use]
    pub fn bucket_key(&self) -> (Method, String) {
        (self.method.clone(), self.key.clone())
    }

    // === Route catalog ===

    /// `GET gateway` - gateway URL discovery
    #[must_use]
    pub fn gateway() -> Self {
        Self::new(Method::GET, "gateway", "gateway")
    }

    /// `GET channels/{channel_id}`
    #[must_use]
    pub fn get_channel(channel_id: Snowflake) -> Self {
        let path = format!("channels/{channel_id}");
        Self::new(Method::GET, path.clone(), path)
    }

    /// `POST channels/{channel_id}/messages`
    #[must_use]
    pub fn create_message(channel_id: Snowflake) -> Self {
        let path = format!("channels/{channel_id}/messages");
        Self::new(Method::POST, path.clone(), path)
    }

    /// `PATCH channels/{channel_id}/messages/{message_id}`
    ///
    /// The message id is a minor parameter and is elided from the key.
    #[must_use]
    pub fn edit_message(channel_id: Snowflake, message_id: Snowflake) -> Self {
        Self::new(
            Method::PATCH,
            format!("channels/{channel_id}/messages/{{0}}"),
            format!("channels/{channel_id}/messages/{message_id}"),
        )
    }

    /// `DELETE channels/{channel_id}/messages/{message_id}`
    #[must_use]
    pub fn delete_message(channel_id: Snowflake, message_id: Snowflake) -> Self {
        Self::new(
            Method::DELETE,
            format!("channels/{channel_id}/messages/{{0}}"),
            format!("channels/{channel_id}/messages/{message_id}"),
        )
    }

    /// `POST channels/{channel_id}/typing`
    #[must_use]
    pub fn trigger_typing(channel_id: Snowflake) -> Self {
        let path = format!("channels/{channel_id}/typing");
        Self::new(Method::POST, path.clone(), path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_parameter_elided_from_key() {
        let channel = Snowflake::new(100);
        let a = Route::edit_message(channel, Snowflake::new(1));
        let b = Route::edit_message(channel, Snowflake::new(2));

        // Different resources, same bucket
        assert_eq!(a.bucket_key(), b.bucket_key());
        assert_ne!(a.path, b.path);
        assert_eq!(a.key, "channels/100/messages/{0}");
    }

    #[test]
    fn test_major_parameter_kept_in_key() {
        let a = Route::create_message(Snowflake::new(100));
        let b = Route::create_message(Snowflake::new(200));

        assert_ne!(a.bucket_key(), b.bucket_key());
    }

    #[test]
    fn test_method_distinguishes_routes() {
        let channel = Snowflake::new(100);
        let edit = Route::edit_message(channel, Snowflake::new(1));
        let delete = Route::delete_message(channel, Snowflake::new(1));

        assert_eq!(edit.key, delete.key);
        assert_ne!(edit.bucket_key(), delete.bucket_key());
    }

    #[test]
    fn test_display() {
        let route = Route::get_channel(Snowflake::new(42));
        assert_eq!(route.to_string(), "GET channels/42");
    }
}
