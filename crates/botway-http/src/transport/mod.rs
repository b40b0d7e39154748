//! HTTP transport wrapper
//!
//! One trait seam ([`RequestSender`]) between the rate-limit coordinator and
//! the wire. The production implementation is [`RestTransport`]; tests plug
//! in an in-memory sender. The transport issues a single exchange and
//! captures the response; it does not interpret rate-limit semantics.

mod rest_transport;

pub use rest_transport::RestTransport;

use crate::error::RestResult;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

/// A single outbound REST exchange
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Request path relative to the API base URL
    pub path: String,
    /// Optional UTF-8 JSON body
    pub body: Option<String>,
    /// Optional audit-log reason, attached as a request header
    pub audit_reason: Option<String>,
}

/// A captured REST response: status, headers, and the full body
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    /// Check for a 2xx status
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Issues one HTTP exchange
#[async_trait]
pub trait RequestSender: Send + Sync + 'static {
    /// Send the request and capture the response.
    ///
    /// A non-2xx status is not an error at this layer; only transport
    /// failures are.
    async fn send(&self, request: ApiRequest) -> RestResult<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_json() {
        let response = ApiResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: r#"{"url": "wss://gateway.example"}"#.to_string(),
        };

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["url"], "wss://gateway.example");
        assert!(response.is_success());
    }
}
