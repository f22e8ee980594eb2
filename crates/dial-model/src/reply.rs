use serde::{Deserialize, Serialize};

/// Result record of a single control command.
///
/// Serializes to exactly `{"ok": "..."}` or `{"error": "..."}`, which is the
/// wire shape control-plane clients match on. Error messages are opaque
/// summaries; the full failure detail stays in the worker log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlReply {
    /// Command succeeded.
    Ok(String),
    /// Command failed; the message points at the worker log for detail.
    Error(String),
}

impl ControlReply {
    /// Build a success reply.
    pub fn ok(msg: impl Into<String>) -> Self {
        Self::Ok(msg.into())
    }

    /// Build an error reply.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    /// Returns `true` for the `Ok` variant.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// The message carried by either variant.
    pub fn message(&self) -> &str {
        match self {
            Self::Ok(msg) | Self::Error(msg) => msg,
        }
    }
}
