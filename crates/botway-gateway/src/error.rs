//! Gateway layer errors

use thiserror::Error;

/// Gateway layer errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// `connect()` was invoked while a session is already running
    #[error("session is already connected")]
    AlreadyConnected,

    /// An operation that needs a live connection was invoked without one
    #[error("session is not connected")]
    NotConnected,

    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("frame encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
