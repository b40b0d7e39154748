//! reqwest-backed transport

use super::{ApiRequest, ApiResponse, RequestSender};
use crate::error::{RestError, RestResult};
use async_trait::async_trait;
use botway_common::ClientConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};

const AUDIT_REASON_HEADER: &str = "x-audit-log-reason";

/// Production HTTP transport
///
/// Authorization (`Bot <token>`) and the user agent are attached as
/// client-wide default headers, so every request carries them without the
/// coordinator knowing about authentication.
pub struct RestTransport {
    http: reqwest::Client,
    base_url: String,
}

impl RestTransport {
    /// Build a transport from the client configuration
    pub fn new(config: &ClientConfig) -> RestResult<Self> {
        let mut headers = HeaderMap::new();

        let mut authorization = HeaderValue::from_str(&format!("Bot {}", config.token))
            .map_err(|_| RestError::InvalidHeader("authorization"))?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("botway/", env!("CARGO_PKG_VERSION"))),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.rest.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.rest.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RequestSender for RestTransport {
    async fn send(&self, request: ApiRequest) -> RestResult<ApiResponse> {
        let url = format!("{}/{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if let Some(body) = request.body {
            builder = builder
                .header(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=utf-8"),
                )
                .body(body);
        }

        if let Some(reason) = &request.audit_reason {
            let value = HeaderValue::from_str(reason)
                .map_err(|_| RestError::InvalidHeader("audit reason"))?;
            builder = builder.header(AUDIT_REASON_HEADER, value);
        }

        tracing::trace!(method = %request.method, path = %request.path, "Sending request");

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        tracing::trace!(status = %status, path = %request.path, "Response received");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
