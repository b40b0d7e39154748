//! Caller-facing request helpers
//!
//! Thin wrappers that validate arguments, assemble the route triple and JSON
//! body, and hand the request to the rate-limit coordinator. Domain payloads
//! come back as raw responses; interpreting them is the caller's business.

mod channels;
mod gateway;
mod messages;

pub use gateway::GatewayInfo;

use crate::error::RestResult;
use crate::ratelimit::RateLimiter;
use crate::routes::Route;
use crate::transport::{ApiResponse, RequestSender, RestTransport};
use botway_common::ClientConfig;
use botway_core::validation;
use std::sync::Arc;

/// REST entry point: a rate-limited, authenticated request surface
#[derive(Clone)]
pub struct Rest {
    limiter: RateLimiter,
}

impl Rest {
    /// Build the production REST surface from the client configuration
    pub fn new(config: &ClientConfig) -> RestResult<Self> {
        let transport = Arc::new(RestTransport::new(config)?);
        Ok(Self::from_transport(transport))
    }

    /// Build a REST surface over an arbitrary transport (used by tests)
    #[must_use]
    pub fn from_transport(transport: Arc<dyn RequestSender>) -> Self {
        Self {
            limiter: RateLimiter::new(transport),
        }
    }

    /// The rate-limit coordinator backing this surface
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Issue a raw request through rate-limit admission.
    ///
    /// The audit reason, when given, is validated against the documented
    /// length limit before anything is admitted.
    pub async fn request(
        &self,
        route: Route,
        body: Option<serde_json::Value>,
        audit_reason: Option<&str>,
    ) -> RestResult<ApiResponse> {
        if let Some(reason) = audit_reason {
            validation::validate_audit_reason(reason)?;
        }
        self.limiter
            .execute(
                route,
                body.map(|v| v.to_string()),
                audit_reason.map(str::to_string),
            )
            .await
    }
}
