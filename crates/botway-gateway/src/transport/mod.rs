//! Gateway WebSocket transport
//!
//! Owns one WebSocket and the seam the send pacer writes through.

mod websocket;

pub use websocket::{GatewaySocket, InboundFrame, SocketReader, SocketWriter};

use crate::error::GatewayError;
use async_trait::async_trait;

/// Write half of the gateway transport, as seen by the send pacer
#[async_trait]
pub(crate) trait FrameSink: Send {
    /// Write one UTF-8 text frame
    async fn send_text(&mut self, frame: String) -> Result<(), GatewayError>;

    /// Send a close frame with the given status code and description, then
    /// shut the write half down
    async fn send_close(&mut self, code: u16, reason: String) -> Result<(), GatewayError>;
}
