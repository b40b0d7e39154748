//! Gateway frame format
//!
//! All messages on the WebSocket follow this shape; only Dispatch frames
//! carry `t` and `s`.

use super::{HelloPayload, IdentifyPayload, OpCode, PresencePayload, ResumePayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One gateway frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayFrame {
    /// Operation code
    pub op: OpCode,

    /// Event name (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayFrame {
    // === Outbound frames ===

    /// Create an Identify frame (op=2)
    #[must_use]
    pub fn identify(payload: IdentifyPayload) -> Self {
        Self::with_payload(OpCode::Identify, &payload)
    }

    /// Create a Resume frame (op=6)
    #[must_use]
    pub fn resume(payload: ResumePayload) -> Self {
        Self::with_payload(OpCode::Resume, &payload)
    }

    /// Create a Heartbeat frame (op=1).
    ///
    /// Carries the last received sequence number, or an explicit null while
    /// none has been received yet.
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            op: OpCode::Heartbeat,
            t: None,
            s: None,
            d: Some(match last_sequence {
                Some(seq) => Value::Number(seq.into()),
                None => Value::Null,
            }),
        }
    }

    /// Create a Presence Update frame (op=3)
    #[must_use]
    pub fn presence_update(payload: PresencePayload) -> Self {
        Self::with_payload(OpCode::PresenceUpdate, &payload)
    }

    fn with_payload<T: Serialize>(op: OpCode, payload: &T) -> Self {
        Self {
            op,
            t: None,
            s: None,
            d: Some(serde_json::to_value(payload).unwrap_or_default()),
        }
    }

    // === Inbound frame parsing ===

    /// Try to parse the Hello payload (op=10)
    #[must_use]
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// View a Dispatch frame (op=0) as `(event name, payload)`
    #[must_use]
    pub fn as_dispatch(&self) -> Option<(&str, &Value)> {
        if self.op != OpCode::Dispatch {
            return None;
        }
        let name = self.t.as_deref()?;
        let data = self.d.as_ref()?;
        Some((name, data))
    }

    // === Utilities ===

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON text frame
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayFrame(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayFrame(op={})", self.op)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botway_core::Intents;

    #[test]
    fn test_heartbeat_frame() {
        let json = GatewayFrame::heartbeat(Some(251)).to_json().unwrap();
        assert_eq!(json, r#"{"op":1,"d":251}"#);

        // No sequence yet: the payload is an explicit null, not absent
        let json = GatewayFrame::heartbeat(None).to_json().unwrap();
        assert_eq!(json, r#"{"op":1,"d":null}"#);
    }

    #[test]
    fn test_identify_frame() {
        let frame = GatewayFrame::identify(IdentifyPayload {
            token: "tok".to_string(),
            intents: Intents::GUILDS,
            properties: Default::default(),
        });

        assert_eq!(frame.op, OpCode::Identify);
        let d = frame.d.unwrap();
        assert_eq!(d["token"], "tok");
        assert_eq!(d["intents"], 1);
        assert!(d["properties"]["os"].is_string());
    }

    #[test]
    fn test_parse_hello() {
        let frame =
            GatewayFrame::from_json(r#"{"op":10,"d":{"heartbeat_interval":41250}}"#).unwrap();
        let hello = frame.as_hello().unwrap();
        assert_eq!(hello.heartbeat_interval, 41250);

        // Wrong opcode parses but is not a Hello
        let frame = GatewayFrame::from_json(r#"{"op":11}"#).unwrap();
        assert!(frame.as_hello().is_none());
    }

    #[test]
    fn test_parse_dispatch() {
        let frame = GatewayFrame::from_json(
            r#"{"op":0,"t":"MESSAGE_CREATE","s":17,"d":{"id":"42","content":"hi"}}"#,
        )
        .unwrap();

        assert_eq!(frame.s, Some(17));
        let (name, data) = frame.as_dispatch().unwrap();
        assert_eq!(name, "MESSAGE_CREATE");
        assert_eq!(data["content"], "hi");
    }

    #[test]
    fn test_unknown_opcode_fails_to_parse() {
        assert!(GatewayFrame::from_json(r#"{"op":4,"d":{}}"#).is_err());
    }

    #[test]
    fn test_display() {
        let frame = GatewayFrame::from_json(r#"{"op":0,"t":"READY","s":1,"d":{}}"#).unwrap();
        assert_eq!(frame.to_string(), "GatewayFrame(op=Dispatch (0), t=READY, s=1)");

        let frame = GatewayFrame::heartbeat(None);
        assert_eq!(frame.to_string(), "GatewayFrame(op=Heartbeat (1))");
    }
}
