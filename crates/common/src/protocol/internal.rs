use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message delivered to extension-owned contexts over the internal bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalMessage {
    pub cmd: String,

    #[serde(default)]
    pub args: Value,
}

impl InternalMessage {
    pub fn new(cmd: impl Into<String>, args: Value) -> Self {
        Self {
            cmd: cmd.into(),
            args,
        }
    }
}

/// Payload of a successful `getBaseUrl`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseUrlResponse {
    pub url: String,
}

/// Frames exchanged with an internal context connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextFrame {
    /// Host to context: a broadcast awaiting a reply or a decline
    Broadcast { seq: u64, message: InternalMessage },

    /// Context to host: settles the broadcast with `seq`
    Reply {
        seq: u64,
        #[serde(default)]
        response: Value,
    },

    /// Context to host: this context does not handle the broadcast
    Decline { seq: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_broadcast_frame_serialization() {
        let frame = ContextFrame::Broadcast {
            seq: 3,
            message: InternalMessage::new("capturer.captureGeneral", json!({"a": 1})),
        };

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "broadcast",
                "seq": 3,
                "message": {"cmd": "capturer.captureGeneral", "args": {"a": 1}}
            })
        );
    }

    #[test]
    fn test_reply_and_decline_parsing() {
        let reply: ContextFrame =
            serde_json::from_str(r#"{"type":"reply","seq":9,"response":{"ok":true}}"#).unwrap();
        assert_eq!(
            reply,
            ContextFrame::Reply {
                seq: 9,
                response: json!({"ok": true})
            }
        );

        // A reply without a response settles with null
        let reply: ContextFrame = serde_json::from_str(r#"{"type":"reply","seq":1}"#).unwrap();
        assert_eq!(
            reply,
            ContextFrame::Reply {
                seq: 1,
                response: Value::Null
            }
        );

        let decline: ContextFrame = serde_json::from_str(r#"{"type":"decline","seq":4}"#).unwrap();
        assert_eq!(decline, ContextFrame::Decline { seq: 4 });
    }

    #[test]
    fn test_unknown_frame_type_is_rejected() {
        assert!(serde_json::from_str::<ContextFrame>(r#"{"type":"cancel","seq":1}"#).is_err());
    }

    #[test]
    fn test_base_url_response_shape() {
        let response = BaseUrlResponse {
            url: "ext://abc/".to_string(),
        };
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"url": "ext://abc/"})
        );
    }
}
