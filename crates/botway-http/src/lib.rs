//! # botway-http
//!
//! REST side of the botway client. Requests flow through a rate-limit
//! coordinator that enforces the server-advertised per-route budget before
//! anything reaches the wire:
//!
//! 1. The route is resolved to a bucket (created lazily on first use).
//! 2. The caller either claims a slot, becomes the bucket's inaugural
//!    *probe* sender, awaits an in-flight probe, or sleeps until the
//!    window resets.
//! 3. After the exchange, rate-limit response headers are reconciled back
//!    into the bucket registry, including remapping routes that the server
//!    reveals to share one bucket.

pub mod api;
pub mod clock;
pub mod error;
pub mod ratelimit;
pub mod routes;
pub mod transport;

// Re-export commonly used types at crate root
pub use api::{GatewayInfo, Rest};
pub use error::{RestError, RestResult};
pub use ratelimit::{Bucket, BucketRegistry, BucketSnapshot, RateLimiter};
pub use routes::Route;
pub use transport::{ApiRequest, ApiResponse, RequestSender, RestTransport};
