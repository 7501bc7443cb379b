use serde_json::Value;

use super::InternalMessage;
use crate::error::{RelayError, Result};
use crate::validation::truncate_for_log;

/// Wire name of the base URL query
pub const GET_BASE_URL: &str = "getBaseUrl";

/// Wire name of the internal broadcast forwarder
pub const RELAY_MESSAGE: &str = "relayMessage";

/// Commands understood by the external relay
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Return the extension root URL; arguments are ignored
    GetBaseUrl,

    /// Forward `{cmd, args}` to every internal context
    RelayMessage(InternalMessage),
}

impl Command {
    /// Resolve a command name and its arguments into a typed command
    ///
    /// Unknown names yield [`RelayError::UnsupportedCommand`].
    pub fn parse(cmd: &str, args: Value) -> Result<Self> {
        match cmd {
            GET_BASE_URL => Ok(Self::GetBaseUrl),
            RELAY_MESSAGE => {
                let message: InternalMessage =
                    serde_json::from_value(args).map_err(|e| RelayError::InvalidArguments {
                        cmd: RELAY_MESSAGE.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Self::RelayMessage(message))
            }
            other => Err(RelayError::UnsupportedCommand(truncate_for_log(other))),
        }
    }

    /// Resolve a raw `cmd` field as sent by the peer
    ///
    /// A name that is not a JSON string is unsupported, like an unknown one.
    pub fn from_wire(cmd: &Value, args: Value) -> Result<Self> {
        match cmd {
            Value::String(name) => Self::parse(name, args),
            other => Err(RelayError::UnsupportedCommand(truncate_for_log(
                &other.to_string(),
            ))),
        }
    }

    /// Wire name of this command
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetBaseUrl => GET_BASE_URL,
            Self::RelayMessage(_) => RELAY_MESSAGE,
        }
    }
}
