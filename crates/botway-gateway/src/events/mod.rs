//! Event dispatch
//!
//! The session forwards every Dispatch frame to a caller-supplied
//! [`EventSink`]; the event-name catalog lists the names the platform emits.

mod event_types;
mod sink;

pub use event_types::GatewayEventType;
pub use sink::EventSink;
