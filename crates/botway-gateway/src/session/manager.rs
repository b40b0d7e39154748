//! Gateway session manager
//!
//! Drives one connection at a time: URL discovery, WebSocket connect, the
//! Hello handshake (Identify or Resume), opcode dispatch, and teardown. The
//! session identity outlives the transport across transient failures so a
//! dropped connection can be resumed; an explicit graceful close resets it.

use crate::error::GatewayError;
use crate::events::{EventSink, GatewayEventType};
use crate::protocol::{
    CloseCode, ConnectionProperties, GatewayFrame, IdentifyPayload, OpCode, PresencePayload,
    ReadyPayload, ResumePayload, CLOSE_NORMAL,
};
use crate::session::send_queue::{spawn_pacer, SendQueue};
use crate::session::state::{ConnectionState, SessionShared};
use crate::session::{heartbeat::spawn_heartbeat, url_cache};
use crate::transport::{GatewaySocket, InboundFrame};
use botway_common::ClientConfig;
use botway_core::Snowflake;
use botway_http::Rest;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Fallback heartbeat interval if the Hello payload is malformed
const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 45_000;

/// What the caller should do after the session terminates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Transient failure; reconnect
    Reconnect,
    /// Terminal; do not reconnect
    Disconnect,
}

impl ConnectionOutcome {
    /// Check whether the caller should open a new connection
    #[must_use]
    pub const fn should_reconnect(&self) -> bool {
        matches!(self, Self::Reconnect)
    }
}

#[derive(Debug, Default)]
struct SessionIdentity {
    session_id: Option<String>,
    user_id: Option<Snowflake>,
}

/// One bot's gateway session
///
/// [`connect`](Self::connect) returns only when the session terminates; the
/// returned [`ConnectionOutcome`] tells the caller whether to call it again.
/// Back-off between attempts is the caller's policy.
pub struct GatewaySession {
    config: ClientConfig,
    rest: Arc<Rest>,
    sink: Arc<dyn EventSink>,
    state: Mutex<ConnectionState>,
    identity: Mutex<SessionIdentity>,
    /// Last sequence number carried over between connections for Resume
    sequence: Mutex<Option<u64>>,
    /// Shared state of the live connection, if any
    current: Mutex<Option<Arc<SessionShared>>>,
}

impl GatewaySession {
    /// Create a session manager; nothing connects until
    /// [`connect`](Self::connect) is called.
    #[must_use]
    pub fn new(config: ClientConfig, rest: Arc<Rest>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            rest,
            sink,
            state: Mutex::new(ConnectionState::Disconnected),
            identity: Mutex::new(SessionIdentity::default()),
            sequence: Mutex::new(None),
            current: Mutex::new(None),
        }
    }

    /// Current connection lifecycle state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Server-assigned session identifier, if a session was established
    #[must_use]
    pub fn session_id(&self) -> Option<String> {
        self.identity.lock().session_id.clone()
    }

    /// The bot's own user id, populated from READY
    #[must_use]
    pub fn user_id(&self) -> Option<Snowflake> {
        self.identity.lock().user_id
    }

    /// Run the session until it terminates.
    ///
    /// Invalid while already connected; the call is rejected before any I/O.
    pub async fn connect(&self) -> Result<ConnectionOutcome, GatewayError> {
        self.connect_with_shutdown(std::future::pending::<()>())
            .await
    }

    /// Run the session until it terminates or `shutdown` completes.
    ///
    /// A fired `shutdown` closes the socket gracefully and yields
    /// [`ConnectionOutcome::Disconnect`].
    pub async fn connect_with_shutdown<F>(
        &self,
        shutdown: F,
    ) -> Result<ConnectionOutcome, GatewayError>
    where
        F: Future<Output = ()> + Send,
    {
        {
            let mut state = self.state.lock();
            if *state != ConnectionState::Disconnected {
                return Err(GatewayError::AlreadyConnected);
            }
            *state = ConnectionState::Connecting;
        }

        let result = self.run(shutdown).await;

        *self.current.lock() = None;
        *self.state.lock() = ConnectionState::Disconnected;
        result
    }

    /// Enqueue a presence update on the live connection
    pub fn update_presence(&self, status: &str) -> Result<(), GatewayError> {
        let payload = PresencePayload {
            status: status.to_string(),
        };
        if !payload.is_valid_status() {
            return Err(GatewayError::InvalidPayload(format!(
                "invalid presence status: {status}"
            )));
        }
        let shared = self
            .current
            .lock()
            .clone()
            .ok_or(GatewayError::NotConnected)?;
        let json = GatewayFrame::presence_update(payload).to_json()?;
        if !shared.queue.enqueue(json, false) {
            return Err(GatewayError::NotConnected);
        }
        Ok(())
    }

    async fn run<F>(&self, shutdown: F) -> Result<ConnectionOutcome, GatewayError>
    where
        F: Future<Output = ()> + Send,
    {
        let url = url_cache::gateway_url(&self.rest, &self.config).await;
        tracing::info!(url = %url, "Connecting to gateway");
        let socket = GatewaySocket::connect(&url).await?;
        let (writer, mut reader) = socket.split();

        let queue = SendQueue::new();
        let shared = SessionShared::new(queue.clone());
        if let Some(seq) = *self.sequence.lock() {
            shared.record_sequence(seq);
        }
        *self.current.lock() = Some(shared.clone());

        let pacer = spawn_pacer(queue, writer, self.config.gateway.send_interval());
        let mut heartbeat: Option<JoinHandle<()>> = None;
        *self.state.lock() = ConnectionState::Connected;

        tokio::pin!(shutdown);
        let outcome = loop {
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    tracing::info!("Shutdown requested, closing session");
                    self.graceful_teardown(&shared, CLOSE_NORMAL, "client requested disconnect");
                    break ConnectionOutcome::Disconnect;
                }
                () = shared.disconnect_requested() => {
                    // Heartbeat zombie: the close frame is already queued
                    self.reset_identity();
                    break ConnectionOutcome::Reconnect;
                }
                frame = reader.next_frame() => match frame {
                    Some(Ok(InboundFrame::Text(text))) => {
                        if let Some(outcome) =
                            self.handle_frame(&shared, &mut heartbeat, &text).await
                        {
                            break outcome;
                        }
                    }
                    Some(Ok(InboundFrame::Close(close))) => {
                        break self.handle_peer_close(&shared, close);
                    }
                    Some(Ok(InboundFrame::Ignored(kind))) => {
                        tracing::trace!(kind, "Skipping non-text frame");
                    }
                    Some(Err(e)) => {
                        // Transient: the identity survives so the next
                        // connection can resume.
                        tracing::warn!(error = %e, "WebSocket error, reconnecting");
                        shared.queue.abort();
                        break ConnectionOutcome::Reconnect;
                    }
                    None => {
                        tracing::info!("Gateway stream ended");
                        shared.queue.abort();
                        break ConnectionOutcome::Reconnect;
                    }
                }
            }
        };

        *self.state.lock() = ConnectionState::Disconnecting;
        if let Some(task) = heartbeat {
            task.abort();
        }
        self.persist_sequence(shared.last_sequence());
        // Let the pacer flush a queued close frame before the socket drops
        let _ = pacer.await;

        Ok(outcome)
    }

    /// Consume one inbound text frame; a returned outcome ends the session.
    async fn handle_frame(
        &self,
        shared: &Arc<SessionShared>,
        heartbeat: &mut Option<JoinHandle<()>>,
        text: &str,
    ) -> Option<ConnectionOutcome> {
        let frame = match GatewayFrame::from_json(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unparseable frame");
                return None;
            }
        };
        if let Some(seq) = frame.s {
            shared.record_sequence(seq);
        }

        match frame.op {
            OpCode::Hello => {
                shared.clear_ack_latch();
                let interval = frame
                    .as_hello()
                    .map_or(DEFAULT_HEARTBEAT_INTERVAL_MS, |h| h.heartbeat_interval);
                if let Some(task) = heartbeat.take() {
                    task.abort();
                }
                *heartbeat = Some(spawn_heartbeat(
                    shared.clone(),
                    Duration::from_millis(interval),
                ));
                tracing::debug!(interval_ms = interval, "Hello received, heartbeat started");

                match self.handshake_frame(shared.last_sequence()).to_json() {
                    Ok(json) => {
                        shared.queue.enqueue(json, false);
                    }
                    Err(e) => tracing::error!(error = %e, "Failed to encode handshake frame"),
                }
                None
            }
            OpCode::HeartbeatAck => {
                shared.clear_ack_latch();
                tracing::trace!("Heartbeat acknowledged");
                None
            }
            OpCode::Reconnect => {
                tracing::info!("Server requested reconnect");
                self.graceful_teardown(shared, CLOSE_NORMAL, "server requested reconnect");
                Some(ConnectionOutcome::Reconnect)
            }
            OpCode::Dispatch => {
                if let Some((name, data)) = frame.as_dispatch() {
                    if name == GatewayEventType::Ready.as_str() {
                        self.record_ready(data);
                    }
                    // User code must not be able to kill the session; the
                    // payload is only borrowed for the duration of the call.
                    if let Err(e) = self.sink.handle_event(name, data).await {
                        tracing::debug!(event = name, error = %e, "Event handler failed");
                    }
                }
                None
            }
            OpCode::InvalidSession => {
                tracing::debug!("Session invalidated by server");
                None
            }
            _ => None,
        }
    }

    /// Build the post-Hello handshake frame: Resume when a session identity
    /// is stored, Identify otherwise.
    fn handshake_frame(&self, last_sequence: Option<u64>) -> GatewayFrame {
        let identity = self.identity.lock();
        match &identity.session_id {
            Some(session_id) => GatewayFrame::resume(ResumePayload {
                token: self.config.token.clone(),
                session_id: session_id.clone(),
                seq: last_sequence,
            }),
            None => GatewayFrame::identify(IdentifyPayload {
                token: self.config.token.clone(),
                intents: self.config.intents,
                properties: ConnectionProperties::default(),
            }),
        }
    }

    /// Store session identity from a READY payload
    fn record_ready(&self, data: &serde_json::Value) {
        match serde_json::from_value::<ReadyPayload>(data.clone()) {
            Ok(ready) => {
                tracing::info!(
                    session_id = %ready.session_id,
                    user_id = %ready.user.id,
                    "Session ready"
                );
                let mut identity = self.identity.lock();
                identity.session_id = Some(ready.session_id);
                identity.user_id = Some(ready.user.id);
            }
            Err(e) => tracing::warn!(error = %e, "Malformed READY payload"),
        }
    }

    /// Peer closed the connection: always reconnect, but a close code that
    /// rules out resuming clears the stored identity so the next connect
    /// identifies fresh.
    fn handle_peer_close(
        &self,
        shared: &SessionShared,
        close: Option<(u16, String)>,
    ) -> ConnectionOutcome {
        shared.queue.abort();
        match close {
            Some((code, reason)) => match CloseCode::from_u16(code) {
                Some(known) => {
                    tracing::warn!(code, reason = %reason, "Gateway closed: {known}");
                    if !known.should_resume() {
                        self.reset_identity();
                    }
                }
                None => tracing::warn!(code, reason = %reason, "Gateway closed"),
            },
            None => tracing::warn!("Gateway closed without a status"),
        }
        ConnectionOutcome::Reconnect
    }

    /// Queue a graceful close and reset the session identity.
    ///
    /// The close request is serialized on the send queue's lock, so no
    /// frame can be emitted mid-teardown.
    fn graceful_teardown(&self, shared: &SessionShared, code: u16, reason: &str) {
        shared.queue.request_close(code, reason);
        self.reset_identity();
    }

    fn reset_identity(&self) {
        let mut identity = self.identity.lock();
        identity.session_id = None;
        identity.user_id = None;
        *self.sequence.lock() = None;
    }

    /// Carry the sequence over to the next connection, but only while the
    /// stored session is still resumable.
    fn persist_sequence(&self, seq: Option<u64>) {
        let identity = self.identity.lock();
        if identity.session_id.is_some() {
            *self.sequence.lock() = seq;
        }
    }
}
