use crate::domain::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire message exchanged through the session mailbox
///
/// The schema is closed: unknown tags fail decoding with a handled
/// error instead of reaching session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum SessionMessage {
    #[serde(rename = "CHAT", rename_all = "camelCase")]
    Chat { text: String, timestamp: Timestamp },

    #[serde(rename = "READY_STATE", rename_all = "camelCase")]
    ReadyState { is_ready: bool, timestamp: Timestamp },

    #[serde(rename = "GAME_START", rename_all = "camelCase")]
    GameStart {
        game_id: Uuid,
        start_marker: u64,
        seed: u64,
        timestamp: Timestamp,
    },

    #[serde(rename = "GAME_ABORT", rename_all = "camelCase")]
    GameAbort { reason: String, timestamp: Timestamp },
}

/// Errors raised at the wire boundary
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Unrecognized or malformed payload: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl SessionMessage {
    /// Create a chat message stamped with the current time
    pub fn chat(text: impl Into<String>) -> Self {
        SessionMessage::Chat {
            text: text.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Create a ready-state message
    pub fn ready_state(is_ready: bool) -> Self {
        SessionMessage::ReadyState {
            is_ready,
            timestamp: Timestamp::now(),
        }
    }

    /// Create a game-start message
    pub fn game_start(game_id: Uuid, start_marker: u64, seed: u64) -> Self {
        SessionMessage::GameStart {
            game_id,
            start_marker,
            seed,
            timestamp: Timestamp::now(),
        }
    }

    /// Create a game-abort message
    pub fn game_abort(reason: impl Into<String>) -> Self {
        SessionMessage::GameAbort {
            reason: reason.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Timestamp carried by any message variant
    pub fn timestamp(&self) -> Timestamp {
        match self {
            SessionMessage::Chat { timestamp, .. }
            | SessionMessage::ReadyState { timestamp, .. }
            | SessionMessage::GameStart { timestamp, .. }
            | SessionMessage::GameAbort { timestamp, .. } => *timestamp,
        }
    }

    /// Encode for the relay
    pub fn to_wire(&self) -> Result<String, MessageError> {
        serde_json::to_string(self).map_err(MessageError::Encode)
    }

    /// Decode a payload received from the relay
    pub fn from_wire(raw: &str) -> Result<Self, MessageError> {
        serde_json::from_str(raw).map_err(MessageError::Malformed)
    }
}
