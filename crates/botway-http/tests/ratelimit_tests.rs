//! Rate-limit coordinator scenarios against an in-memory transport

use async_trait::async_trait;
use botway_core::Snowflake;
use botway_http::{
    ApiRequest, ApiResponse, RequestSender, Rest, RestError, RestResult, Route,
};
use chrono::Utc;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

type Responder = Box<dyn Fn(&ApiRequest, usize) -> RestResult<ApiResponse> + Send + Sync>;

/// In-memory transport: records every request, optionally gates sends on a
/// semaphore so tests can hold the inaugural probe open.
struct MockSender {
    log: Mutex<Vec<ApiRequest>>,
    gate: Option<Arc<Semaphore>>,
    responder: Responder,
}

impl MockSender {
    fn new(responder: Responder) -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            gate: None,
            responder,
        }
    }

    fn gated(responder: Responder, gate: Arc<Semaphore>) -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            gate: Some(gate),
            responder,
        }
    }

    fn calls(&self) -> usize {
        self.log.lock().len()
    }
}

#[async_trait]
impl RequestSender for MockSender {
    async fn send(&self, request: ApiRequest) -> RestResult<ApiResponse> {
        let index = {
            let mut log = self.log.lock();
            log.push(request.clone());
            log.len() - 1
        };
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        (self.responder)(&request, index)
    }
}

fn rate_limited_response(
    limit: u64,
    remaining: u64,
    reset_in: Duration,
    bucket: Option<&str>,
) -> ApiResponse {
    let mut headers = HeaderMap::new();
    let reset = Utc::now().timestamp() as f64 + reset_in.as_secs_f64();
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from_str(&limit.to_string()).unwrap(),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from_str(&remaining.to_string()).unwrap(),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-reset"),
        HeaderValue::from_str(&format!("{reset:.3}")).unwrap(),
    );
    if let Some(id) = bucket {
        headers.insert(
            HeaderName::from_static("x-ratelimit-bucket"),
            HeaderValue::from_str(id).unwrap(),
        );
    }
    ApiResponse {
        status: StatusCode::OK,
        headers,
        body: "{}".to_string(),
    }
}

#[tokio::test]
async fn probe_is_serialized_across_concurrent_admissions() {
    let gate = Arc::new(Semaphore::new(0));
    let sender = Arc::new(MockSender::gated(
        Box::new(|_, _| Ok(rate_limited_response(5, 4, Duration::from_secs(60), None))),
        gate.clone(),
    ));
    let rest = Rest::from_transport(sender.clone());

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let rest = rest.clone();
        tasks.push(tokio::spawn(async move {
            rest.get_channel(Snowflake::new(7)).await
        }));
    }

    // Only the inaugural probe reaches the transport while its response is
    // outstanding; the other four are parked on its completion signal.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sender.calls(), 1);

    // Release the probe (and every later send). The response grants
    // remaining=4, so all four waiters proceed.
    gate.add_permits(64);
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(sender.calls(), 5);
}

#[tokio::test]
async fn exhausted_window_blocks_until_reset() {
    let sender = Arc::new(MockSender::new(Box::new(|_, _| {
        Ok(rate_limited_response(1, 0, Duration::from_millis(400), None))
    })));
    let rest = Rest::from_transport(sender.clone());
    let channel = Snowflake::new(9);

    // Probe discovers a window with nothing left in it.
    rest.get_channel(channel).await.unwrap();
    assert_eq!(sender.calls(), 1);

    // The next admission must sleep out the window before sending.
    let started = Instant::now();
    rest.get_channel(channel).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(sender.calls(), 2);
}

#[tokio::test]
async fn shared_bucket_identifier_collapses_routes() {
    let sender = Arc::new(MockSender::new(Box::new(|_, _| {
        Ok(rate_limited_response(
            5,
            4,
            Duration::from_secs(60),
            Some("XYZ"),
        ))
    })));
    let rest = Rest::from_transport(sender.clone());
    let route_a = Route::new(Method::POST, "a", "a");
    let route_b = Route::new(Method::POST, "b", "b");

    rest.request(route_a.clone(), None, None).await.unwrap();
    let bucket_a = rest.limiter().registry().bucket_for_route(&route_a);
    assert!(Arc::ptr_eq(
        &rest.limiter().registry().bucket_for_id("XYZ").unwrap(),
        &bucket_a
    ));

    // Route B's first response reveals the same identifier.
    let bucket_b = rest.limiter().registry().bucket_for_route(&route_b);
    rest.request(route_b.clone(), None, None).await.unwrap();

    assert!(bucket_b.is_duplicate());
    let resolved = rest.limiter().registry().bucket_for_route(&route_b);
    assert!(Arc::ptr_eq(&resolved, &bucket_a));

    // Admissions on route B now draw from the shared window: the probe on A
    // left remaining=4, B's response lowered nothing, so B's traffic
    // decrements the same bucket.
    rest.request(route_b, None, None).await.unwrap();
    assert!(bucket_a.snapshot().remaining < 4);
}

#[tokio::test]
async fn failed_probe_surfaces_error_and_unlocks_the_bucket() {
    let sender = Arc::new(MockSender::new(Box::new(|_, index| {
        if index == 0 {
            Err(RestError::Connection("connection refused".to_string()))
        } else {
            Ok(rate_limited_response(5, 4, Duration::from_secs(60), None))
        }
    })));
    let rest = Rest::from_transport(sender.clone());
    let channel = Snowflake::new(3);

    // The inaugural sender sees the failure...
    let err = rest.get_channel(channel).await.unwrap_err();
    assert!(err.is_transient());

    // ...and the next caller becomes a fresh probe instead of deadlocking.
    rest.get_channel(channel).await.unwrap();
    assert_eq!(sender.calls(), 2);
}

#[tokio::test]
async fn cancelled_wait_surfaces_cancellation() {
    let sender = Arc::new(MockSender::new(Box::new(|_, _| {
        Ok(rate_limited_response(1, 0, Duration::from_secs(60), None))
    })));
    let rest = Rest::from_transport(sender.clone());
    let channel = Snowflake::new(5);

    rest.get_channel(channel).await.unwrap();

    // The window is exhausted for a minute; cancel after 100ms instead.
    let started = Instant::now();
    let result = rest
        .limiter()
        .execute_cancellable(
            Route::get_channel(channel),
            None,
            None,
            tokio::time::sleep(Duration::from_millis(100)),
        )
        .await;

    assert!(matches!(result, Err(RestError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(1));
    // The cancelled wait never reached the transport.
    assert_eq!(sender.calls(), 1);
}

#[tokio::test]
async fn audit_reason_is_validated_and_forwarded() {
    let sender = Arc::new(MockSender::new(Box::new(|_, _| {
        Ok(rate_limited_response(5, 4, Duration::from_secs(60), None))
    })));
    let rest = Rest::from_transport(sender.clone());
    let channel = Snowflake::new(1);
    let message = Snowflake::new(2);

    rest.delete_message(channel, message, Some("spam"))
        .await
        .unwrap();
    assert_eq!(
        sender.log.lock()[0].audit_reason.as_deref(),
        Some("spam")
    );

    // Oversized reasons are rejected before any admission.
    let oversized = "x".repeat(botway_core::validation::MAX_AUDIT_REASON + 1);
    let err = rest
        .delete_message(channel, message, Some(&oversized))
        .await
        .unwrap_err();
    assert!(matches!(err, RestError::Domain(_)));
    assert_eq!(sender.calls(), 1);
}
