use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

pub const EVENT_COPY: &str = "copy";
pub const EVENT_SKIP: &str = "skip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressChannel {
    Copy,
    Skip,
}

impl ProgressChannel {
    pub const ALL: [ProgressChannel; 2] = [ProgressChannel::Copy, ProgressChannel::Skip];

    pub fn event_name(self) -> &'static str {
        match self {
            ProgressChannel::Copy => EVENT_COPY,
            ProgressChannel::Skip => EVENT_SKIP,
        }
    }
}

impl fmt::Display for ProgressChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Payload carried by both `copy` and `skip` events: the cumulative count for
/// the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountPayload {
    pub count: u64,
}

impl CountPayload {
    pub fn new(count: u64) -> Self {
        Self { count }
    }

    pub fn to_value(self) -> serde_json::Value {
        serde_json::json!({ "count": self.count })
    }

    /// Validates an inbound payload. Anything other than an object with a
    /// non-negative integer `count` is a protocol violation.
    pub fn parse(
        channel: ProgressChannel,
        payload: &serde_json::Value,
    ) -> Result<Self, ProtocolError> {
        if !payload.is_object() {
            return Err(ProtocolError::MalformedPayload {
                channel,
                reason: format!("expected an object, got {payload}"),
            });
        }
        serde_json::from_value::<CountPayload>(payload.clone()).map_err(|err| {
            ProtocolError::MalformedPayload {
                channel,
                reason: err.to_string(),
            }
        })
    }
}
