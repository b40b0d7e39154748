//! Rate-limit bucket
//!
//! One bucket per active route (or per server-assigned identifier once
//! discovered). A bucket is in one of three states, decided under its lock:
//!
//! - *Expired*: no window is known (`reset` absent or in the past) and no
//!   probe is in flight. The first caller to leave this state becomes the
//!   inaugural sender; everyone else waits for its result.
//! - *Probing*: the inaugural request is in flight. New callers await its
//!   completion signal without claiming a slot.
//! - *Active*: `reset` lies in the future. Callers race to decrement
//!   `remaining` under the lock; when it hits zero they sleep until `reset`.
//!
//! Header updates defend against response reordering: `remaining` can only
//! be lowered while a window is active, `reset` never rolls backwards, and a
//! superseded (duplicate) bucket is frozen entirely.

use super::headers::RateLimitHeaders;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// A token budget for one logical endpoint group
#[derive(Debug)]
pub struct Bucket {
    state: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    /// Advertised capacity per window; unknown until the first reply
    limit: Option<u64>,
    /// Tokens left in the current window
    remaining: u64,
    /// Wall-clock instant at which the window refreshes
    reset: Option<DateTime<Utc>>,
    /// Completion signal of the in-flight inaugural request, if any
    first_request: Option<watch::Receiver<bool>>,
    /// Terminal marker: this bucket was superseded by another that shares
    /// its server identifier
    duplicate: bool,
}

impl BucketState {
    fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.reset.is_some_and(|reset| reset > now)
    }
}

/// What a caller should do next, decided atomically under the bucket lock
#[derive(Debug)]
pub(crate) enum AdmissionDecision {
    /// The bucket was superseded; resolve again via the route index
    Reresolve,
    /// A slot was claimed; go send
    Claimed,
    /// The caller is the inaugural sender; complete the held sender when
    /// the probe finishes so waiters wake
    Probe(watch::Sender<bool>),
    /// A probe is in flight; await its completion and re-admit
    AwaitProbe(watch::Receiver<bool>),
    /// The window is exhausted; sleep until this instant and re-admit
    WaitUntil(DateTime<Utc>),
}

impl Bucket {
    /// Create a fresh bucket in the expired state
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(BucketState {
                limit: None,
                remaining: 0,
                reset: None,
                first_request: None,
                duplicate: false,
            }),
        })
    }

    /// Decide how a caller may proceed at instant `now`.
    ///
    /// Claiming a slot (the `Claimed` decision) decrements `remaining` as a
    /// side effect; all other decisions leave the state untouched except for
    /// installing the probe signal.
    pub(crate) fn admit(&self, now: DateTime<Utc>) -> AdmissionDecision {
        let mut state = self.state.lock();
        if state.duplicate {
            return AdmissionDecision::Reresolve;
        }
        match state.reset.filter(|reset| *reset > now) {
            // Active window
            Some(reset) => {
                if state.remaining > 0 {
                    state.remaining -= 1;
                    AdmissionDecision::Claimed
                } else {
                    AdmissionDecision::WaitUntil(reset)
                }
            }
            // No live window: probe, or wait for the probe already out
            None => match &state.first_request {
                Some(receiver) => AdmissionDecision::AwaitProbe(receiver.clone()),
                None => {
                    let (sender, receiver) = watch::channel(false);
                    state.first_request = Some(receiver);
                    AdmissionDecision::Probe(sender)
                }
            },
        }
    }

    /// Fold one response's headers into the bucket.
    ///
    /// No-op once the bucket is marked duplicate.
    pub(crate) fn reconcile(&self, now: DateTime<Utc>, headers: &RateLimitHeaders) {
        let mut state = self.state.lock();
        if state.duplicate {
            return;
        }
        if let Some(limit) = headers.limit {
            state.limit = Some(limit);
        }
        if let Some(remaining) = headers.remaining {
            // A stale response must not hand back tokens already claimed
            // in this window.
            if !state.is_active(now) || remaining < state.remaining {
                state.remaining = remaining;
            }
        }
        if let Some(reset) = headers.reset {
            if state.reset.is_none_or(|current| reset > current) {
                state.reset = Some(reset);
            }
        }
    }

    /// Clear the inaugural-request marker so the bucket leaves the probing
    /// state (to active if a window was granted, back to expired otherwise).
    pub(crate) fn finish_probe(&self) {
        self.state.lock().first_request = None;
    }

    /// Mark this bucket as superseded. Terminal.
    pub(crate) fn mark_duplicate(&self) {
        self.state.lock().duplicate = true;
    }

    /// Check the terminal duplicate marker
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.state.lock().duplicate
    }

    /// A point-in-time copy of the bucket state, for logging and tests
    #[must_use]
    pub fn snapshot(&self) -> BucketSnapshot {
        let state = self.state.lock();
        BucketSnapshot {
            limit: state.limit,
            remaining: state.remaining,
            reset: state.reset,
            probing: state.first_request.is_some(),
            duplicate: state.duplicate,
        }
    }
}

/// Point-in-time view of a bucket's state
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSnapshot {
    pub limit: Option<u64>,
    pub remaining: u64,
    pub reset: Option<DateTime<Utc>>,
    pub probing: bool,
    pub duplicate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn window(limit: u64, remaining: u64, reset: DateTime<Utc>) -> RateLimitHeaders {
        RateLimitHeaders {
            bucket: None,
            limit: Some(limit),
            remaining: Some(remaining),
            reset: Some(reset),
        }
    }

    #[test]
    fn test_fresh_bucket_admits_single_probe() {
        let bucket = Bucket::new();
        let now = Utc::now();

        let first = bucket.admit(now);
        assert!(matches!(first, AdmissionDecision::Probe(_)));

        // While the probe is out, everyone else waits on it
        let second = bucket.admit(now);
        assert!(matches!(second, AdmissionDecision::AwaitProbe(_)));
    }

    #[test]
    fn test_probe_completion_signal_wakes_waiters() {
        let bucket = Bucket::new();
        let now = Utc::now();

        let sender = match bucket.admit(now) {
            AdmissionDecision::Probe(sender) => sender,
            other => panic!("expected probe, got {other:?}"),
        };
        let mut receiver = match bucket.admit(now) {
            AdmissionDecision::AwaitProbe(receiver) => receiver,
            other => panic!("expected await, got {other:?}"),
        };

        bucket.finish_probe();
        sender.send_replace(true);
        assert!(*receiver.borrow_and_update());
        assert!(!bucket.snapshot().probing);
    }

    #[test]
    fn test_active_bucket_claims_until_exhausted() {
        let bucket = Bucket::new();
        let now = Utc::now();
        let reset = now + Duration::seconds(60);
        bucket.reconcile(now, &window(2, 2, reset));

        assert!(matches!(bucket.admit(now), AdmissionDecision::Claimed));
        assert!(matches!(bucket.admit(now), AdmissionDecision::Claimed));
        match bucket.admit(now) {
            AdmissionDecision::WaitUntil(instant) => assert_eq!(instant, reset),
            other => panic!("expected wait, got {other:?}"),
        }
        assert_eq!(bucket.snapshot().remaining, 0);
    }

    #[test]
    fn test_expired_window_reenters_probe_state() {
        let bucket = Bucket::new();
        let now = Utc::now();
        bucket.reconcile(now - chrono::Duration::seconds(20), &window(5, 0, now - Duration::seconds(10)));

        // The window lapsed, so the next caller probes again
        assert!(matches!(bucket.admit(now), AdmissionDecision::Probe(_)));
    }

    #[test]
    fn test_out_of_order_headers_cannot_relax_the_budget() {
        let bucket = Bucket::new();
        let now = Utc::now();

        // Response B (received first): remaining=3, reset=T+10
        bucket.reconcile(now, &window(5, 3, now + Duration::seconds(10)));
        // Response A (sent first, received second): remaining=4, reset=T+5
        bucket.reconcile(now, &window(5, 4, now + Duration::seconds(5)));

        let snapshot = bucket.snapshot();
        assert_eq!(snapshot.remaining, 3);
        assert_eq!(snapshot.reset, Some(now + Duration::seconds(10)));
    }

    #[test]
    fn test_stale_remaining_applies_when_window_expired() {
        let bucket = Bucket::new();
        let now = Utc::now();

        // No active window: the header is authoritative even if larger
        bucket.reconcile(now, &window(5, 4, now - Duration::seconds(1)));
        assert_eq!(bucket.snapshot().remaining, 4);
    }

    #[test]
    fn test_duplicate_bucket_is_frozen() {
        let bucket = Bucket::new();
        let now = Utc::now();
        bucket.reconcile(now, &window(5, 5, now + Duration::seconds(60)));

        bucket.mark_duplicate();
        bucket.reconcile(now, &window(9, 9, now + Duration::seconds(120)));

        let snapshot = bucket.snapshot();
        assert_eq!(snapshot.limit, Some(5));
        assert_eq!(snapshot.remaining, 5);
        assert_eq!(snapshot.reset, Some(now + Duration::seconds(60)));
        assert!(matches!(bucket.admit(now), AdmissionDecision::Reresolve));
    }
}
