//! Heartbeat scheduler
//!
//! Emits one heartbeat per server-advertised interval and enforces a single
//! outstanding acknowledgement: if the previous beat was never acked, the
//! session is zombied and must be torn down for a reconnect.

use super::state::SessionShared;
use crate::protocol::{GatewayFrame, CLOSE_PROTOCOL_ERROR};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Start the heartbeat task for one connection.
///
/// The task is replaced (aborted and respawned) whenever a new Hello
/// arrives, and aborted when the session ends.
pub(crate) fn spawn_heartbeat(shared: Arc<SessionShared>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            if shared.is_waiting_for_ack() {
                tracing::warn!(
                    interval_ms = interval.as_millis() as u64,
                    "Heartbeat not acknowledged within one interval, closing connection"
                );
                shared
                    .queue
                    .request_close(CLOSE_PROTOCOL_ERROR, "heartbeat ack not received");
                shared.request_disconnect();
                return;
            }

            let frame = GatewayFrame::heartbeat(shared.last_sequence());
            match frame.to_json() {
                Ok(json) => {
                    // Head insertion: the heartbeat preempts any backlog
                    if !shared.queue.enqueue(json, true) {
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to encode heartbeat frame");
                    return;
                }
            }
            shared.set_waiting_for_ack();
            tracing::trace!(seq = ?shared.last_sequence(), "Heartbeat enqueued");
        }
    })
}
