mod command;
mod internal;
mod message;
mod response;

pub use command::{Command, GET_BASE_URL, RELAY_MESSAGE};
pub use internal::{BaseUrlResponse, ContextFrame, InternalMessage};
pub use message::{MessageId, RelayMessage};
pub use response::{ErrorBody, RelayResponse, is_truthy, reported_error};
