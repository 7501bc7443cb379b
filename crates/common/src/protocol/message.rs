use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-chosen correlation id, echoed back untouched
///
/// Any JSON value is accepted. Uniqueness within a connection is the
/// caller's responsibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Value);

impl From<Value> for MessageId {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inbound command envelope sent by the external peer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Correlation id, `null` when the peer omits it
    #[serde(default)]
    pub id: MessageId,

    /// Command name, e.g. "getBaseUrl" or "relayMessage"
    ///
    /// Kept as raw JSON so a wrongly typed name still reaches dispatch and
    /// is answered under the caller's id.
    #[serde(default)]
    pub cmd: Value,

    /// Command arguments, `null` when omitted
    #[serde(default)]
    pub args: Value,
}

impl RelayMessage {
    /// Create a new relay message
    pub fn new(id: impl Into<MessageId>, cmd: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            cmd: Value::String(cmd.into()),
            args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_relay_message_parsing() {
        let json = r#"{"id":7,"cmd":"getBaseUrl","args":{}}"#;
        let parsed: RelayMessage = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.id, MessageId::from(7));
        assert_eq!(parsed.cmd, "getBaseUrl");
        assert_eq!(parsed.args, json!({}));
    }

    #[test]
    fn test_relay_message_defaults() {
        let parsed: RelayMessage = serde_json::from_str("{}").unwrap();

        assert_eq!(parsed.id, MessageId(Value::Null));
        assert_eq!(parsed.cmd, Value::Null);
        assert_eq!(parsed.args, Value::Null);
    }

    #[test]
    fn test_message_id_is_opaque() {
        let json = r#"{"id":{"seq":3,"tag":"a"},"cmd":"getBaseUrl"}"#;
        let parsed: RelayMessage = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.id.0, json!({"seq": 3, "tag": "a"}));
        assert_eq!(serde_json::to_value(&parsed.id).unwrap(), parsed.id.0);
    }

    #[test]
    fn test_message_id_display() {
        assert_eq!(MessageId::from(12).to_string(), "12");
        assert_eq!(MessageId::from("abc").to_string(), r#""abc""#);
    }

    #[test]
    fn test_wrongly_typed_cmd_keeps_id() {
        let parsed: RelayMessage = serde_json::from_str(r#"{"id":5,"cmd":42,"args":{}}"#).unwrap();
        assert_eq!(parsed.id, MessageId::from(5));
        assert_eq!(parsed.cmd, json!(42));

        let parsed: RelayMessage = serde_json::from_str(r#"{"id":6,"cmd":null}"#).unwrap();
        assert_eq!(parsed.id, MessageId::from(6));
        assert_eq!(parsed.cmd, Value::Null);
    }

    #[test]
    fn test_scalar_is_rejected() {
        assert!(serde_json::from_str::<RelayMessage>(r#""getBaseUrl""#).is_err());
        assert!(serde_json::from_str::<RelayMessage>("42").is_err());
    }
}
