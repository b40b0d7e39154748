//! Snowflake ID - 64-bit unique identifier assigned by the platform
//!
//! The high 42 bits carry a millisecond timestamp relative to the platform
//! epoch; the client never mints these, it only parses and compares them.

use crate::validation::validate_id;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Platform-assigned Snowflake ID (64-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(u64);

impl Snowflake {
    /// Platform epoch: 2024-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1704067200000;

    /// Create a new Snowflake from a raw u64 value
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// Check if the Snowflake is zero (uninitialized)
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Extract timestamp (milliseconds since Unix epoch)
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> 22) as i64 + Self::EPOCH
    }

    /// Convert timestamp to DateTime<Utc>
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_millis_opt(self.timestamp())
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
    }

    /// Parse from string representation
    ///
    /// Accepts only non-empty ASCII digit strings.
    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        validate_id(s).map_err(|_| SnowflakeParseError::InvalidFormat)?;
        s.parse::<u64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::OutOfRange)
    }
}

/// Error when parsing a Snowflake from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
    #[error("snowflake out of range")]
    OutOfRange,
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Snowflake {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for u64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Serialize as string for JSON (JavaScript BigInt safety)
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SnowflakeVisitor;

        impl serde::de::Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a snowflake id as string or integer")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Snowflake(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Snowflake::parse(value).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let id = Snowflake::parse("123456789012345678").unwrap();
        assert_eq!(id.into_inner(), 123456789012345678);
    }

    #[test]
    fn test_parse_rejects_non_digits() {
        assert_eq!(
            Snowflake::parse("12a45"),
            Err(SnowflakeParseError::InvalidFormat)
        );
        assert_eq!(Snowflake::parse(""), Err(SnowflakeParseError::InvalidFormat));
        assert_eq!(
            Snowflake::parse("-123"),
            Err(SnowflakeParseError::InvalidFormat)
        );
    }

    #[test]
    fn test_timestamp_extraction() {
        // 1 second past the epoch, shifted into the timestamp bits
        let id = Snowflake::new(1000 << 22);
        assert_eq!(id.timestamp(), Snowflake::EPOCH + 1000);
    }

    #[test]
    fn test_json_round_trip_as_string() {
        let id = Snowflake::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");

        let back: Snowflake = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, id);

        // Numbers are accepted on input for robustness
        let from_number: Snowflake = serde_json::from_str("42").unwrap();
        assert_eq!(from_number, id);
    }
}
