//! WebSocket close codes
//!
//! The standard codes the client closes with, and the gateway-specific
//! 4000-series codes the server may close us with.

use serde::{Deserialize, Serialize};

/// Standard close status for a caller-requested disconnect
pub const CLOSE_NORMAL: u16 = 1000;

/// Standard close status for a protocol violation (e.g. a missed
/// heartbeat acknowledgement)
pub const CLOSE_PROTOCOL_ERROR: u16 = 1002;

/// Gateway close codes sent by the server
///
/// Received in the close frame when the server terminates the connection;
/// they decide whether the stored session is still worth resuming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error occurred
    UnknownError = 4000,
    /// Invalid opcode sent
    UnknownOpcode = 4001,
    /// Invalid payload encoding (JSON decode error)
    DecodeError = 4002,
    /// Sent a payload before Identify
    NotAuthenticated = 4003,
    /// Invalid token provided
    AuthenticationFailed = 4004,
    /// Sent Identify twice
    AlreadyAuthenticated = 4005,
    /// Invalid sequence number for Resume
    InvalidSequence = 4007,
    /// Too many frames (rate limited)
    RateLimited = 4008,
    /// Session has timed out
    SessionTimeout = 4009,
    /// Invalid shard configuration
    InvalidShard = 4010,
    /// Sharding is required
    ShardingRequired = 4011,
    /// Invalid or outdated protocol version
    InvalidApiVersion = 4012,
    /// Invalid intents bitmask
    InvalidIntents = 4013,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownOpcode),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::NotAuthenticated),
            4004 => Some(Self::AuthenticationFailed),
            4005 => Some(Self::AlreadyAuthenticated),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimeout),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::ShardingRequired),
            4012 => Some(Self::InvalidApiVersion),
            4013 => Some(Self::InvalidIntents),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if the stored session identity is still worth resuming after
    /// this close code. When false, the next connect should identify fresh.
    #[must_use]
    pub const fn should_resume(self) -> bool {
        matches!(
            self,
            Self::UnknownError | Self::UnknownOpcode | Self::DecodeError | Self::RateLimited
        )
    }

    /// Get the description for this close code
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::UnknownOpcode => "Invalid opcode sent",
            Self::DecodeError => "Invalid payload encoding",
            Self::NotAuthenticated => "Not authenticated",
            Self::AuthenticationFailed => "Authentication failed",
            Self::AlreadyAuthenticated => "Already authenticated",
            Self::InvalidSequence => "Invalid sequence number",
            Self::RateLimited => "Rate limited",
            Self::SessionTimeout => "Session timeout",
            Self::InvalidShard => "Invalid shard configuration",
            Self::ShardingRequired => "Sharding required",
            Self::InvalidApiVersion => "Invalid protocol version",
            Self::InvalidIntents => "Invalid intents",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_round_trip() {
        assert_eq!(CloseCode::from_u16(4000), Some(CloseCode::UnknownError));
        assert_eq!(
            CloseCode::from_u16(4004),
            Some(CloseCode::AuthenticationFailed)
        );
        assert_eq!(CloseCode::from_u16(4013), Some(CloseCode::InvalidIntents));
        assert_eq!(CloseCode::from_u16(4006), None);
        assert_eq!(CloseCode::from_u16(1000), None);

        assert_eq!(CloseCode::SessionTimeout.as_u16(), 4009);
    }

    #[test]
    fn test_should_resume() {
        assert!(CloseCode::UnknownError.should_resume());
        assert!(CloseCode::RateLimited.should_resume());

        // A rejected or timed-out session must identify fresh
        assert!(!CloseCode::AuthenticationFailed.should_resume());
        assert!(!CloseCode::SessionTimeout.should_resume());
        assert!(!CloseCode::InvalidSequence.should_resume());
        assert!(!CloseCode::InvalidIntents.should_resume());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CloseCode::RateLimited.to_string(),
            "Rate limited (4008)"
        );
    }
}
