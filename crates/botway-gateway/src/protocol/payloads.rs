//! Gateway payload definitions
//!
//! Payload structures for the frames the client sends and the handshake
//! frames it consumes.

use botway_core::{Intents, Snowflake};
use serde::{Deserialize, Serialize};

/// Payload of op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload of op 2 (Identify)
///
/// Sent by the client to establish a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authentication token
    pub token: String,

    /// Event-category subscription bitmask
    pub intents: Intents,

    /// Client connection properties
    pub properties: ConnectionProperties,
}

/// Client connection properties sent at identify time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionProperties {
    /// Operating system
    pub os: String,

    /// Client library name
    pub browser: String,

    /// Device type
    pub device: String,
}

impl Default for ConnectionProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "botway".to_string(),
            device: "botway".to_string(),
        }
    }
}

/// Payload of op 6 (Resume)
///
/// Sent by the client to reattach to a previously issued session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Authentication token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last received sequence number, null if none was ever received
    pub seq: Option<u64>,
}

/// Payload of op 3 (Presence Update)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresencePayload {
    /// New status (online, idle, dnd, offline)
    pub status: String,
}

impl PresencePayload {
    /// Valid status values
    pub const VALID_STATUSES: &'static [&'static str] = &["online", "idle", "dnd", "offline"];

    /// Check if the status is valid
    #[must_use]
    pub fn is_valid_status(&self) -> bool {
        Self::VALID_STATUSES.contains(&self.status.as_str())
    }
}

/// The fields of the READY dispatch payload the session needs
///
/// Everything else in the payload is forwarded to the event sink untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    /// Server-assigned session identifier, required for Resume
    pub session_id: String,

    /// The bot's own user
    pub user: ReadyUser,
}

/// The bot identity inside the READY payload
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyUser {
    pub id: Snowflake,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_payload_serialization() {
        let payload = IdentifyPayload {
            token: "token123".to_string(),
            intents: Intents::GUILDS | Intents::GUILD_MESSAGES,
            properties: ConnectionProperties {
                os: "linux".to_string(),
                browser: "botway".to_string(),
                device: "botway".to_string(),
            },
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["token"], "token123");
        assert_eq!(json["intents"], 5);
        assert_eq!(json["properties"]["os"], "linux");
    }

    #[test]
    fn test_resume_payload_serialization() {
        let payload = ResumePayload {
            token: "token123".to_string(),
            session_id: "session456".to_string(),
            seq: Some(42),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["session_id"], "session456");
        assert_eq!(json["seq"], 42);

        let no_seq = ResumePayload {
            seq: None,
            ..payload
        };
        assert_eq!(serde_json::to_value(&no_seq).unwrap()["seq"], serde_json::Value::Null);
    }

    #[test]
    fn test_presence_status_validation() {
        let valid = PresencePayload {
            status: "idle".to_string(),
        };
        assert!(valid.is_valid_status());

        let invalid = PresencePayload {
            status: "busy".to_string(),
        };
        assert!(!invalid.is_valid_status());
    }

    #[test]
    fn test_ready_payload_extraction() {
        let payload: ReadyPayload = serde_json::from_str(
            r#"{"session_id": "abc", "user": {"id": "123", "username": "bot"}, "extra": 1}"#,
        )
        .unwrap();
        assert_eq!(payload.session_id, "abc");
        assert_eq!(payload.user.id, Snowflake::new(123));
    }
}
