//! Command dispatch for the external relay
//!
//! [`CommandRelay`] turns one inbound [`RelayMessage`] into exactly one
//! [`RelayResponse`]. Every failure, including unknown commands and errors
//! reported by the context that settled a broadcast, is caught here and
//! encoded into the error wire shape.

use capture_relay_common::protocol::reported_error;
use capture_relay_common::validation::sanitize_for_log;
use capture_relay_common::{
    BaseUrlResponse, Command, InternalBus, RelayError, RelayMessage, RelayResponse, Result,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Executes external commands against the extension root URL and the bus
#[derive(Debug, Clone)]
pub struct CommandRelay {
    base_url: String,
    bus: InternalBus,
}

impl CommandRelay {
    pub fn new(base_url: impl Into<String>, bus: InternalBus) -> Self {
        Self {
            base_url: base_url.into(),
            bus,
        }
    }

    /// Extension root URL returned by `getBaseUrl`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run a typed command
    ///
    /// A `null` broadcast result fails with [`RelayError::EmptyResult`]; a
    /// result whose `error` field is truthy is turned into
    /// [`RelayError::Remote`].
    pub async fn execute(&self, command: Command) -> Result<Value> {
        let result = match command {
            Command::GetBaseUrl => serde_json::to_value(BaseUrlResponse {
                url: self.base_url.clone(),
            })?,
            Command::RelayMessage(message) => {
                let inner_cmd = sanitize_for_log(&message.cmd);
                debug!("Relaying internal message: {}", inner_cmd);
                let result = self.bus.broadcast(message).await?;
                if result.is_null() {
                    return Err(RelayError::EmptyResult(inner_cmd));
                }
                result
            }
        };

        if let Some(message) = reported_error(&result) {
            return Err(RelayError::Remote(message));
        }

        Ok(result)
    }

    /// Handle one inbound message end to end
    pub async fn handle(&self, message: RelayMessage) -> RelayResponse {
        let RelayMessage { id, cmd, args } = message;

        let outcome = match Command::from_wire(&cmd, args) {
            Ok(command) => self.execute(command).await,
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            let name = match &cmd {
                Value::String(name) => sanitize_for_log(name),
                other => sanitize_for_log(&other.to_string()),
            };
            warn!("Command {} (id {}) failed: {}", name, id, e);
        }

        RelayResponse::from_outcome(id, outcome)
    }
}
