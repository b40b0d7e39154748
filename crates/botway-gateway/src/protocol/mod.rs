//! Gateway wire protocol
//!
//! JSON text frames of the shape `{ "op": <int>, "d": <payload>,
//! "s": <seq?>, "t": <event name?> }`.

mod close_codes;
mod frames;
mod opcodes;
mod payloads;

pub use close_codes::{CloseCode, CLOSE_NORMAL, CLOSE_PROTOCOL_ERROR};
pub use frames::GatewayFrame;
pub use opcodes::OpCode;
pub use payloads::{
    ConnectionProperties, HelloPayload, IdentifyPayload, PresencePayload, ReadyPayload,
    ResumePayload,
};
