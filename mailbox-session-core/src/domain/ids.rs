use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relay mailbox address of a single participant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(addr: impl Into<String>) -> Self {
        ActorId(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ActorId {
    fn from(addr: &str) -> Self {
        ActorId(addr.to_string())
    }
}

/// Relay mailbox address of the session itself
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(addr: impl Into<String>) -> Self {
        SessionId(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(addr: &str) -> Self {
        SessionId(addr.to_string())
    }
}
