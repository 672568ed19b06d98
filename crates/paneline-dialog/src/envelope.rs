//! Message envelope exchanged between the parent panel and a child window.
//!
//! Every message travels as a JSON object over the platform string channel:
//! - `{"kind":"ready"}`: child -> parent, once its own setup completes
//! - `{"kind":"initialize","payload":{...}}`: parent -> child, answers `ready`
//! - `{"kind":"update","payload":{...}}`: parent -> child, any number of times
//! - `{"kind":"dialog_closed"}`: local broadcast when the child goes away
//!
//! Inbound parsing is forgiving. Kinds this build does not know decode to
//! [`Decoded::Unknown`] so newer peers can add message kinds freely.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The closed set of message kinds this build understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Ready,
    Initialize,
    Update,
    DialogClosed,
}

impl MessageKind {
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Ready,
        MessageKind::Initialize,
        MessageKind::Update,
        MessageKind::DialogClosed,
    ];

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Ready => "ready",
            MessageKind::Initialize => "initialize",
            MessageKind::Update => "update",
            MessageKind::DialogClosed => "dialog_closed",
        }
    }

    /// Look up a kind by its wire name (case-sensitive).
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed cross-window message. The payload shape follows from the kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Ready,
    Initialize(Value),
    Update(Value),
    DialogClosed,
}

/// Result of decoding an inbound string that was well-formed JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Known(Envelope),
    /// A kind from a newer (or foreign) peer. Not an error.
    Unknown { kind: String },
}

/// Why an inbound message produced no dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Not JSON, or JSON without a string `kind`.
    Malformed,
    UnknownKind(String),
    /// Known data kind without a `payload` key.
    InvalidPayload(MessageKind),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Malformed => f.write_str("malformed envelope"),
            DropReason::UnknownKind(kind) => write!(f, "unknown kind {kind:?}"),
            DropReason::InvalidPayload(kind) => write!(f, "invalid payload for {kind}"),
        }
    }
}

#[derive(Serialize)]
struct OutboundEnvelope<'a> {
    kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a Value>,
}

#[derive(Deserialize)]
struct InboundEnvelope {
    kind: String,
    /// `None` only when the key is absent; `"payload":null` is `Some(Null)`.
    #[serde(default, deserialize_with = "present")]
    payload: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Envelope {
    pub fn kind(&self) -> MessageKind {
        match self {
            Envelope::Ready => MessageKind::Ready,
            Envelope::Initialize(_) => MessageKind::Initialize,
            Envelope::Update(_) => MessageKind::Update,
            Envelope::DialogClosed => MessageKind::DialogClosed,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Envelope::Initialize(payload) | Envelope::Update(payload) => Some(payload),
            Envelope::Ready | Envelope::DialogClosed => None,
        }
    }

    /// Serialize to the wire string.
    pub fn to_json(&self) -> String {
        let wire = OutboundEnvelope {
            kind: self.kind(),
            payload: self.payload(),
        };
        // A `Value` always has string keys, so this cannot fail in practice.
        serde_json::to_string(&wire)
            .unwrap_or_else(|_| format!("{{\"kind\":\"{}\"}}", self.kind()))
    }

    /// Parse a raw inbound string.
    ///
    /// Unknown kinds are `Ok(Decoded::Unknown)`; only structurally broken
    /// input is an `Err`. A payload on `ready` or `dialog_closed` is ignored.
    pub fn decode(raw: &str) -> Result<Decoded, DropReason> {
        let inbound: InboundEnvelope =
            serde_json::from_str(raw).map_err(|_| DropReason::Malformed)?;

        let Some(kind) = MessageKind::from_wire(&inbound.kind) else {
            return Ok(Decoded::Unknown { kind: inbound.kind });
        };

        let envelope = match (kind, inbound.payload) {
            (MessageKind::Ready, _) => Envelope::Ready,
            (MessageKind::DialogClosed, _) => Envelope::DialogClosed,
            (MessageKind::Initialize, Some(payload)) => Envelope::Initialize(payload),
            (MessageKind::Update, Some(payload)) => Envelope::Update(payload),
            (kind, None) => return Err(DropReason::InvalidPayload(kind)),
        };
        Ok(Decoded::Known(envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_wire_names_match_serde() {
        for kind in MessageKind::ALL {
            let via_serde = serde_json::to_string(&kind).unwrap();
            assert_eq!(via_serde, format!("\"{}\"", kind.as_str()));
            assert_eq!(MessageKind::from_wire(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn from_wire_is_case_sensitive() {
        assert_eq!(MessageKind::from_wire("READY"), None);
        assert_eq!(MessageKind::from_wire("Ready"), None);
        assert_eq!(MessageKind::from_wire(""), None);
    }

    #[test]
    fn ready_serializes_without_payload() {
        assert_eq!(Envelope::Ready.to_json(), r#"{"kind":"ready"}"#);
        assert_eq!(Envelope::DialogClosed.to_json(), r#"{"kind":"dialog_closed"}"#);
    }

    #[test]
    fn initialize_serializes_with_payload() {
        let env = Envelope::Initialize(json!({"change": "X"}));
        assert_eq!(env.to_json(), r#"{"kind":"initialize","payload":{"change":"X"}}"#);
    }

    #[test]
    fn decode_known_kinds() {
        let decoded = Envelope::decode(r#"{"kind":"update","payload":{"change":"Y"}}"#).unwrap();
        assert_eq!(
            decoded,
            Decoded::Known(Envelope::Update(json!({"change": "Y"})))
        );

        let decoded = Envelope::decode(r#"{"kind":"ready"}"#).unwrap();
        assert_eq!(decoded, Decoded::Known(Envelope::Ready));
    }

    #[test]
    fn decode_ignores_payload_on_ready() {
        let decoded = Envelope::decode(r#"{"kind":"ready","payload":{"extra":1}}"#).unwrap();
        assert_eq!(decoded, Decoded::Known(Envelope::Ready));
    }

    #[test]
    fn decode_unknown_kind_is_not_an_error() {
        let decoded = Envelope::decode(r#"{"kind":"theme_changed","payload":"dark"}"#).unwrap();
        assert_eq!(
            decoded,
            Decoded::Unknown {
                kind: "theme_changed".into()
            }
        );
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert_eq!(Envelope::decode("not json"), Err(DropReason::Malformed));
        assert_eq!(Envelope::decode(""), Err(DropReason::Malformed));
        assert_eq!(Envelope::decode("{}"), Err(DropReason::Malformed));
        assert_eq!(Envelope::decode(r#"{"kind":42}"#), Err(DropReason::Malformed));
        assert_eq!(Envelope::decode("[1,2,3]"), Err(DropReason::Malformed));
    }

    #[test]
    fn decode_rejects_missing_payload_for_data_kinds() {
        assert_eq!(
            Envelope::decode(r#"{"kind":"initialize"}"#),
            Err(DropReason::InvalidPayload(MessageKind::Initialize))
        );
        assert_eq!(
            Envelope::decode(r#"{"kind":"update"}"#),
            Err(DropReason::InvalidPayload(MessageKind::Update))
        );
    }

    #[test]
    fn null_payload_survives_the_wire() {
        for env in [Envelope::Initialize(Value::Null), Envelope::Update(Value::Null)] {
            let raw = env.to_json();
            assert!(raw.ends_with(r#""payload":null}"#));
            assert_eq!(Envelope::decode(&raw), Ok(Decoded::Known(env)));
        }
    }

    #[test]
    fn payload_accessors() {
        let env = Envelope::Update(json!([1, 2]));
        assert_eq!(env.payload(), Some(&json!([1, 2])));
        assert_eq!(Envelope::Ready.payload(), None);
    }
}
