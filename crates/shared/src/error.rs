use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::ProgressChannel;

/// Failure reported by the copy engine when `start_copy` rejects.
///
/// The message is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for EngineError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for EngineError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Violation of the progress event contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("unexpected {channel} event payload: {reason}")]
    MalformedPayload {
        channel: ProgressChannel,
        reason: String,
    },
}
