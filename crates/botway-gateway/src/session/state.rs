//! Shared per-connection state
//!
//! One [`SessionShared`] exists per live connection, shared between the
//! receive loop, the heartbeat scheduler, and the send pacer.

use super::send_queue::SendQueue;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No transport; `connect()` may be called
    Disconnected,
    /// Transport opening, waiting for Hello
    Connecting,
    /// Session is live
    Connected,
    /// Teardown in progress
    Disconnecting,
}

/// State shared between the receive loop, heartbeat scheduler, and pacer
/// for the lifetime of one connection.
#[derive(Debug)]
pub(crate) struct SessionShared {
    /// Outbound frame queue feeding the send pacer
    pub(crate) queue: Arc<SendQueue>,

    /// Set when a heartbeat goes out, cleared by HeartbeatAck or Hello
    waiting_for_heartbeat_ack: AtomicBool,

    /// Last sequence number seen on an inbound frame; negative = none yet
    last_sequence: AtomicI64,

    /// Signals the receive loop that a disconnect was requested from
    /// outside it (heartbeat zombie detection)
    disconnect: Notify,
    disconnect_requested: AtomicBool,
}

impl SessionShared {
    pub(crate) fn new(queue: Arc<SendQueue>) -> Arc<Self> {
        Arc::new(Self {
            queue,
            waiting_for_heartbeat_ack: AtomicBool::new(false),
            last_sequence: AtomicI64::new(-1),
            disconnect: Notify::new(),
            disconnect_requested: AtomicBool::new(false),
        })
    }

    /// Record a sequence number from an inbound frame
    pub(crate) fn record_sequence(&self, seq: u64) {
        let clamped = i64::try_from(seq).unwrap_or(i64::MAX);
        self.last_sequence.store(clamped, Ordering::SeqCst);
    }

    /// Last sequence number, or `None` while still at the sentinel
    pub(crate) fn last_sequence(&self) -> Option<u64> {
        let raw = self.last_sequence.load(Ordering::SeqCst);
        u64::try_from(raw).ok()
    }

    pub(crate) fn set_waiting_for_ack(&self) {
        self.waiting_for_heartbeat_ack.store(true, Ordering::SeqCst);
    }

    pub(crate) fn clear_ack_latch(&self) {
        self.waiting_for_heartbeat_ack.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_waiting_for_ack(&self) -> bool {
        self.waiting_for_heartbeat_ack.load(Ordering::SeqCst)
    }

    /// Ask the receive loop to end the session with a reconnect.
    ///
    /// Used by the heartbeat scheduler when an acknowledgement is missed;
    /// the close frame itself goes through the send queue.
    pub(crate) fn request_disconnect(&self) {
        self.disconnect_requested.store(true, Ordering::SeqCst);
        self.disconnect.notify_one();
    }

    pub(crate) async fn disconnect_requested(&self) {
        if self.disconnect_requested.load(Ordering::SeqCst) {
            return;
        }
        self.disconnect.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_sentinel() {
        let shared = SessionShared::new(SendQueue::new());
        assert_eq!(shared.last_sequence(), None);

        shared.record_sequence(0);
        assert_eq!(shared.last_sequence(), Some(0));

        shared.record_sequence(99);
        assert_eq!(shared.last_sequence(), Some(99));
    }

    #[test]
    fn test_ack_latch() {
        let shared = SessionShared::new(SendQueue::new());
        assert!(!shared.is_waiting_for_ack());

        shared.set_waiting_for_ack();
        assert!(shared.is_waiting_for_ack());

        shared.clear_ack_latch();
        assert!(!shared.is_waiting_for_ack());
    }

    #[tokio::test]
    async fn test_disconnect_signal_is_sticky() {
        let shared = SessionShared::new(SendQueue::new());
        shared.request_disconnect();
        // Must not hang even though the signal fired before we listened
        shared.disconnect_requested().await;
    }
}
