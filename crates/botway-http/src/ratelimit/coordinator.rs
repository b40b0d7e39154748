//! Rate-limit coordinator
//!
//! The admission protocol in front of the HTTP transport: resolve the
//! route's bucket, wait or claim, send, then reconcile the response headers
//! back into the registry before surfacing the result.

use super::bucket::{AdmissionDecision, Bucket};
use super::headers::RateLimitHeaders;
use super::registry::BucketRegistry;
use crate::clock::{Clock, SystemClock};
use crate::error::{RestError, RestResult};
use crate::routes::Route;
use crate::transport::{ApiRequest, ApiResponse, RequestSender};
use reqwest::header::HeaderMap;
use std::future::Future;
use std::sync::Arc;

/// Admission front-end over the HTTP transport
///
/// Cheap to clone; clones share the registry and transport.
#[derive(Clone)]
pub struct RateLimiter {
    registry: Arc<BucketRegistry>,
    transport: Arc<dyn RequestSender>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a coordinator over the given transport
    #[must_use]
    pub fn new(transport: Arc<dyn RequestSender>) -> Self {
        Self::with_clock(transport, Arc::new(SystemClock))
    }

    /// Create a coordinator with a custom time source
    #[must_use]
    pub fn with_clock(transport: Arc<dyn RequestSender>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: Arc::new(BucketRegistry::new()),
            transport,
            clock,
        }
    }

    /// The bucket registry backing this coordinator
    #[must_use]
    pub fn registry(&self) -> &BucketRegistry {
        &self.registry
    }

    /// Execute a request under the route's budget, waiting as needed.
    pub async fn execute(
        &self,
        route: Route,
        body: Option<String>,
        audit_reason: Option<String>,
    ) -> RestResult<ApiResponse> {
        self.execute_cancellable(route, body, audit_reason, std::future::pending::<()>())
            .await
    }

    /// Execute a request under the route's budget.
    ///
    /// `cancel` aborts admission waits and in-flight non-probe sends with
    /// [`RestError::Cancelled`]. A probe keeps running on its own task even
    /// if the caller that started it is cancelled, so the waiters parked on
    /// it are never stranded.
    pub async fn execute_cancellable<C>(
        &self,
        route: Route,
        body: Option<String>,
        audit_reason: Option<String>,
        cancel: C,
    ) -> RestResult<ApiResponse>
    where
        C: Future<Output = ()> + Send,
    {
        tokio::pin!(cancel);

        loop {
            let bucket = self.registry.bucket_for_route(&route);
            match bucket.admit(self.clock.now()) {
                AdmissionDecision::Reresolve => continue,

                AdmissionDecision::Claimed => {
                    let request = build_request(&route, &body, &audit_reason);
                    return tokio::select! {
                        biased;
                        () = &mut cancel => Err(RestError::Cancelled),
                        result = self.send_and_reconcile(&route, &bucket, request) => result,
                    };
                }

                AdmissionDecision::Probe(done) => {
                    let this = self.clone();
                    let probe_route = route.clone();
                    let probe_bucket = bucket.clone();
                    let request = build_request(&route, &body, &audit_reason);
                    let task = tokio::spawn(async move {
                        let result = this
                            .send_and_reconcile(&probe_route, &probe_bucket, request)
                            .await;
                        // Waiters wake regardless of outcome; on failure no
                        // window was installed and the next caller probes
                        // again.
                        probe_bucket.finish_probe();
                        let _ = done.send(true);
                        result
                    });
                    return tokio::select! {
                        biased;
                        () = &mut cancel => Err(RestError::Cancelled),
                        joined = task => match joined {
                            Ok(result) => result,
                            Err(e) => Err(RestError::Task(e.to_string())),
                        },
                    };
                }

                AdmissionDecision::AwaitProbe(mut probe) => {
                    tokio::select! {
                        biased;
                        () = &mut cancel => return Err(RestError::Cancelled),
                        outcome = probe.wait_for(|done| *done) => {
                            // A dropped sender means the probe task died;
                            // re-admission will start a fresh probe.
                            let _ = outcome;
                        }
                    }
                }

                AdmissionDecision::WaitUntil(reset) => {
                    tracing::debug!(
                        route = %route,
                        reset = %reset,
                        "Route budget exhausted, waiting for window reset"
                    );
                    tokio::select! {
                        biased;
                        () = &mut cancel => return Err(RestError::Cancelled),
                        () = self.clock.sleep_until(reset) => {}
                    }
                }
            }
        }
    }

    async fn send_and_reconcile(
        &self,
        route: &Route,
        bucket: &Arc<Bucket>,
        request: ApiRequest,
    ) -> RestResult<ApiResponse> {
        let result = self.transport.send(request).await;
        if let Ok(response) = &result {
            self.reconcile(route, bucket, &response.headers);
        }
        result
    }

    /// Fold one response's rate-limit headers into the registry.
    ///
    /// If the response names a server bucket identifier, the effective
    /// bucket may differ from the one the request was admitted on; every
    /// update from this response applies to the effective bucket.
    fn reconcile(&self, route: &Route, bucket: &Arc<Bucket>, headers: &HeaderMap) {
        let parsed = RateLimitHeaders::parse(headers);
        if parsed.is_empty() {
            return;
        }
        let effective = match &parsed.bucket {
            Some(id) => self.registry.register_server_id(id, bucket, route),
            None => bucket.clone(),
        };
        effective.reconcile(self.clock.now(), &parsed);
    }
}

fn build_request(
    route: &Route,
    body: &Option<String>,
    audit_reason: &Option<String>,
) -> ApiRequest {
    ApiRequest {
        method: route.method.clone(),
        path: route.path.clone(),
        body: body.clone(),
        audit_reason: audit_reason.clone(),
    }
}
