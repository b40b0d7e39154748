//! # botway-gateway
//!
//! Gateway side of the botway client: a long-lived WebSocket session kept
//! alive under the heartbeat/resume protocol. The session manager drives the
//! handshake (identify or resume), consumes inbound opcodes, paces outbound
//! frames, and tells the caller whether to reconnect when the session ends.

pub mod error;
pub mod events;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-export commonly used types at crate root
pub use error::GatewayError;
pub use events::{EventSink, GatewayEventType};
pub use protocol::{
    CloseCode, ConnectionProperties, GatewayFrame, HelloPayload, IdentifyPayload, OpCode,
    PresencePayload, ResumePayload,
};
pub use session::{ConnectionOutcome, ConnectionState, GatewaySession};
