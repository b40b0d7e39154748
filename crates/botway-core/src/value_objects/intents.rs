//! Gateway intents bitmask
//!
//! Selects which categories of events the session will receive. The bitmask
//! is sent verbatim in the Identify payload.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Event-category subscription flags
    ///
    /// Serialized as a bare integer in JSON (the identify payload carries the
    /// raw bitmask).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Intents: u64 {
        /// Guild create/update/delete and role/channel structure events
        const GUILDS                   = 1 << 0;
        /// Member join/update/remove events
        const GUILD_MEMBERS            = 1 << 1;
        /// Message create/update/delete in guild channels
        const GUILD_MESSAGES           = 1 << 2;
        /// Reaction add/remove in guild channels
        const GUILD_MESSAGE_REACTIONS  = 1 << 3;
        /// Presence updates
        const GUILD_PRESENCES          = 1 << 4;
        /// Typing notifications in guild channels
        const GUILD_TYPING             = 1 << 5;
        /// Message events in direct messages
        const DIRECT_MESSAGES          = 1 << 6;
        /// Reaction events in direct messages
        const DIRECT_MESSAGE_REACTIONS = 1 << 7;
        /// Full message content in message events
        const MESSAGE_CONTENT          = 1 << 8;

        /// Baseline subscription for a typical bot
        const DEFAULT = Self::GUILDS.bits()
            | Self::GUILD_MESSAGES.bits()
            | Self::DIRECT_MESSAGES.bits();
    }
}

impl Intents {
    /// Get a list of all individual intents that are set
    pub fn list(&self) -> Vec<&'static str> {
        let mut result = Vec::new();
        for (name, flag) in Self::all().iter_names() {
            if self.contains(flag) {
                result.push(name);
            }
        }
        result
    }

    /// Parse from string representation (decimal bitmask)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Intents::from_bits_truncate)
    }
}

impl Default for Intents {
    fn default() -> Self {
        Intents::DEFAULT
    }
}

impl fmt::Display for Intents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u64::deserialize(deserializer)?;
        Ok(Intents::from_bits_truncate(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_intents() {
        let intents = Intents::default();
        assert!(intents.contains(Intents::GUILDS));
        assert!(intents.contains(Intents::GUILD_MESSAGES));
        assert!(intents.contains(Intents::DIRECT_MESSAGES));
        assert!(!intents.contains(Intents::GUILD_PRESENCES));
    }

    #[test]
    fn test_serialized_as_bare_integer() {
        let intents = Intents::GUILDS | Intents::GUILD_MESSAGES;
        let json = serde_json::to_string(&intents).unwrap();
        assert_eq!(json, "5");

        let back: Intents = serde_json::from_str("5").unwrap();
        assert_eq!(back, intents);
    }

    #[test]
    fn test_unknown_bits_truncated() {
        let intents: Intents = serde_json::from_str(&(u64::MAX).to_string()).unwrap();
        assert_eq!(intents, Intents::all());
    }

    #[test]
    fn test_list() {
        let intents = Intents::GUILDS | Intents::MESSAGE_CONTENT;
        let list = intents.list();
        assert!(list.contains(&"GUILDS"));
        assert!(list.contains(&"MESSAGE_CONTENT"));
        assert!(!list.contains(&"GUILD_MEMBERS"));
    }
}
