use crate::domain::ActorId;
use instant::Instant;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp in milliseconds since application start (monotonic)
///
/// Serializable and comparable, suitable for deterministic ordering.
/// Uses instant::Instant internally for WASM compatibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp representing the current moment
    pub fn now() -> Self {
        // One anchor point for all timestamps in the process
        static ANCHOR: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let anchor = ANCHOR.get_or_init(Instant::now);

        let elapsed = Instant::now().duration_since(*anchor);
        Timestamp(elapsed.as_millis() as u64)
    }

    /// Get the raw milliseconds value
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Create a timestamp from a raw milliseconds value
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// A participant in the lobby, as reported by the relay
///
/// Members are mutated only from inbound relay notifications. The local
/// member's ready flag is sent over the wire, never asserted locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Member {
    /// Relay mailbox address of this member
    actor: ActorId,
    /// Display name (unique within a lobby)
    display_name: String,
    /// Ready flag, driven by READY_STATE messages
    is_ready: bool,
}

/// Errors that can occur when working with members
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MemberError {
    #[error("Display name cannot be empty")]
    EmptyName,

    #[error("Display name must be between 1 and 50 characters")]
    InvalidNameLength,
}

impl Member {
    pub fn new(actor: ActorId, display_name: impl Into<String>) -> Result<Self, MemberError> {
        let display_name = display_name.into();
        Self::validate_name(&display_name)?;

        Ok(Member {
            actor,
            display_name,
            is_ready: false,
        })
    }

    /// Validate display name according to relay rules
    fn validate_name(name: &str) -> Result<(), MemberError> {
        if name.is_empty() {
            return Err(MemberError::EmptyName);
        }

        if name.len() > 50 {
            return Err(MemberError::InvalidNameLength);
        }

        Ok(())
    }

    // Getters

    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Set the ready flag (driven by an inbound READY_STATE notification)
    pub fn set_ready(&mut self, is_ready: bool) {
        self.is_ready = is_ready;
    }
}
