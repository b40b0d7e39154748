//! Caller-supplied event handler

use async_trait::async_trait;
use serde_json::Value;

/// Handler invoked once per Dispatch frame.
///
/// The payload reference is only valid for the duration of the call; copy
/// out anything that must outlive it. A returned error is logged and
/// swallowed at the session boundary so user code can never kill the
/// session.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Handle one named event
    async fn handle_event(&self, name: &str, data: &Value) -> anyhow::Result<()>;
}
