//! Paced send queue
//!
//! Outbound frames are queued under one lock and released by a pacer task at
//! most one per fixed interval, keeping the client under the server's
//! gateway frame budget. Heartbeats jump the queue via head insertion.
//!
//! Teardown is serialized on the same lock: once a close or abort is
//! requested, no further frame can be emitted mid-teardown.

use crate::transport::FrameSink;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Outbound frame queue with head insertion for priority traffic
#[derive(Debug)]
pub struct SendQueue {
    inner: Mutex<Inner>,
    notify: Notify,
}

#[derive(Debug)]
struct Inner {
    frames: VecDeque<String>,
    teardown: Option<Teardown>,
}

#[derive(Debug)]
enum Teardown {
    Close { code: u16, reason: String },
    Abort,
}

/// What the pacer should do next, decided under the queue lock
#[derive(Debug)]
pub(crate) enum Action {
    /// Write this frame, then pace
    Send(String),
    /// Queue is empty; park until a producer signals
    Park,
    /// Emit a close frame and stop
    Close { code: u16, reason: String },
    /// Stop without a close frame
    Abort,
}

impl SendQueue {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                frames: VecDeque::new(),
                teardown: None,
            }),
            notify: Notify::new(),
        })
    }

    /// Enqueue a text frame; priority frames go to the head of the queue.
    ///
    /// Returns false (and drops the frame) once teardown has been
    /// requested.
    pub fn enqueue(&self, frame: String, priority: bool) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.teardown.is_some() {
                return false;
            }
            if priority {
                inner.frames.push_front(frame);
            } else {
                inner.frames.push_back(frame);
            }
        }
        self.notify.notify_one();
        true
    }

    /// Request a graceful teardown: the pacer emits a close frame with this
    /// status and stops. First request wins.
    pub fn request_close(&self, code: u16, reason: &str) {
        {
            let mut inner = self.inner.lock();
            if inner.teardown.is_none() {
                inner.teardown = Some(Teardown::Close {
                    code,
                    reason: reason.to_string(),
                });
            }
        }
        self.notify.notify_one();
    }

    /// Request an abrupt teardown: the pacer stops without a close frame.
    /// Overrides a pending graceful close.
    pub fn abort(&self) {
        self.inner.lock().teardown = Some(Teardown::Abort);
        self.notify.notify_one();
    }

    /// Number of frames waiting
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The close status requested via [`request_close`](Self::request_close),
    /// if teardown is pending and graceful.
    #[must_use]
    pub fn pending_close(&self) -> Option<u16> {
        match &self.inner.lock().teardown {
            Some(Teardown::Close { code, .. }) => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn next_action(&self) -> Action {
        let mut inner = self.inner.lock();
        match inner.teardown.take() {
            Some(Teardown::Abort) => {
                inner.teardown = Some(Teardown::Abort);
                Action::Abort
            }
            Some(Teardown::Close { code, reason }) => {
                // Leave the queue closed for producers after the close frame
                inner.teardown = Some(Teardown::Abort);
                Action::Close { code, reason }
            }
            None => match inner.frames.pop_front() {
                Some(frame) => Action::Send(frame),
                None => Action::Park,
            },
        }
    }

    async fn parked(&self) {
        self.notify.notified().await;
    }
}

/// Start the pacer task: drains the queue through `sink`, releasing at most
/// one frame per `interval`, with an immediate first fire after idling.
pub(crate) fn spawn_pacer<S>(queue: Arc<SendQueue>, mut sink: S, interval: Duration) -> JoinHandle<()>
where
    S: FrameSink + 'static,
{
    tokio::spawn(async move {
        loop {
            match queue.next_action() {
                Action::Send(frame) => {
                    if let Err(e) = sink.send_text(frame).await {
                        tracing::warn!(error = %e, "Failed to write gateway frame");
                        queue.abort();
                        return;
                    }
                    tokio::time::sleep(interval).await;
                }
                Action::Park => queue.parked().await,
                Action::Close { code, reason } => {
                    if let Err(e) = sink.send_close(code, reason).await {
                        tracing::debug!(error = %e, "Failed to send close frame");
                    }
                    return;
                }
                Action::Abort => return,
            }
        }
    })
}
