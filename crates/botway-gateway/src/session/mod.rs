//! Gateway session
//!
//! The session manager and the pieces it coordinates: the paced send queue,
//! the heartbeat scheduler, the shared per-connection state, and the
//! process-wide gateway URL cache.

mod heartbeat;
mod manager;
mod send_queue;
mod state;
mod url_cache;

pub use manager::{ConnectionOutcome, GatewaySession};
pub use send_queue::SendQueue;
pub use state::ConnectionState;
