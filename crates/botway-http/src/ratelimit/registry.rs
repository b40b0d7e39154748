//! Bucket registry
//!
//! Two indices over the live buckets:
//!
//! - Index A: `(method, route key) -> bucket`, consulted on every admission.
//! - Index B: `server bucket id -> bucket`, populated once the server
//!   reveals an identifier in a response header.
//!
//! When two routes turn out to share a server identifier, Index A is
//! remapped to the canonical bucket and the superseded one is marked
//! duplicate, never to be returned again.
//!
//! Lock order is fixed: Index A, then Index B, then any bucket lock.

use super::bucket::Bucket;
use crate::routes::Route;
use parking_lot::Mutex;
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of rate-limit buckets for one client
#[derive(Debug, Default)]
pub struct BucketRegistry {
    /// Index A: route template -> bucket
    by_route: Mutex<HashMap<(Method, String), Arc<Bucket>>>,
    /// Index B: server-assigned identifier -> bucket
    by_id: Mutex<HashMap<String, Arc<Bucket>>>,
}

impl BucketRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the bucket for a route, creating one lazily on first use.
    ///
    /// Never returns a bucket that was already superseded at the time of the
    /// lookup; a caller can still observe the duplicate marker afterwards and
    /// must then resolve again.
    #[must_use]
    pub fn bucket_for_route(&self, route: &Route) -> Arc<Bucket> {
        let mut by_route = self.by_route.lock();
        by_route
            .entry(route.bucket_key())
            .or_insert_with(Bucket::new)
            .clone()
    }

    /// Look up a bucket by its server-assigned identifier
    #[must_use]
    pub fn bucket_for_id(&self, id: &str) -> Option<Arc<Bucket>> {
        self.by_id.lock().get(id).cloned()
    }

    /// Record the server-assigned identifier revealed by a response on
    /// `route`, and return the *effective* bucket that all header updates
    /// from that response must apply to.
    ///
    /// If the identifier is new, `bucket` becomes its canonical owner. If it
    /// already names a different bucket, the route is remapped to that
    /// canonical bucket and `bucket` is marked duplicate.
    pub fn register_server_id(
        &self,
        id: &str,
        bucket: &Arc<Bucket>,
        route: &Route,
    ) -> Arc<Bucket> {
        let mut by_route = self.by_route.lock();
        let mut by_id = self.by_id.lock();

        match by_id.get(id) {
            None => {
                by_id.insert(id.to_string(), bucket.clone());
                bucket.clone()
            }
            Some(existing) if Arc::ptr_eq(existing, bucket) => bucket.clone(),
            Some(existing) => {
                let canonical = existing.clone();
                by_route.insert(route.bucket_key(), canonical.clone());
                bucket.mark_duplicate();
                tracing::debug!(
                    bucket_id = %id,
                    route = %route,
                    "Route collapsed onto shared rate-limit bucket"
                );
                canonical
            }
        }
    }

    /// Number of distinct buckets reachable from the route index
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.by_route.lock().len()
    }
}
