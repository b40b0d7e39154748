//! Per-route rate limiting
//!
//! The server describes its budget through response headers; the client must
//! never exceed it even when many requests race. Every route resolves to a
//! [`Bucket`] whose three-state lifecycle (expired, probing, active)
//! serializes the first request per route so the budget is discovered before
//! concurrent traffic is released.

mod bucket;
mod coordinator;
mod headers;
mod registry;

pub use bucket::{Bucket, BucketSnapshot};
pub use coordinator::RateLimiter;
pub use headers::RateLimitHeaders;
pub use registry::BucketRegistry;
