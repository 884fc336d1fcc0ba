use mailbox_session_core::{MessageError, SessionError};

/// Failure of a single relay operation
///
/// Retried inside the delivery pipeline; never reaches callers raw.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Insufficient spendable balance")]
    InsufficientBalance,

    #[error("No eligible funding units")]
    NoFundingUnits,

    #[error("Relay rejected the request: {0}")]
    Rejected(String),

    #[error("Relay unreachable: {0}")]
    Unreachable(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Whether waiting for the funding balance to replenish could make
    /// a retry succeed. Typed variants are authoritative; for relay
    /// error strings the legacy message text is inspected.
    pub fn is_funding_related(&self) -> bool {
        match self {
            TransportError::InsufficientBalance | TransportError::NoFundingUnits => true,
            TransportError::Rejected(msg) | TransportError::Unreachable(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("insufficient balance")
                    || msg.contains("no spendable")
                    || msg.contains("funding unit")
            }
            _ => false,
        }
    }
}

/// All delivery attempts exhausted
///
/// Callers decide whether this is fatal (chat) or tolerable
/// (ready-state).
#[derive(Debug, thiserror::Error)]
#[error("Delivery failed after {attempts} attempt(s): {source}")]
pub struct DeliveryError {
    pub attempts: u32,
    #[source]
    pub source: TransportError,
}

/// Errors surfaced by the lobby coordinator
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("No mailbox transport bound")]
    NotConfigured,

    #[error("A session is already active")]
    AlreadyInSession,

    #[error("No active session")]
    NotInSession,

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_funding_errors() {
        assert!(TransportError::InsufficientBalance.is_funding_related());
        assert!(TransportError::NoFundingUnits.is_funding_related());
    }

    #[test]
    fn test_legacy_message_text_classification() {
        let err = TransportError::Rejected("Insufficient balance to cover relay fee".to_string());
        assert!(err.is_funding_related());

        let err = TransportError::Rejected("no spendable outputs available".to_string());
        assert!(err.is_funding_related());
    }

    #[test]
    fn test_generic_errors_are_not_funding_related() {
        assert!(!TransportError::Timeout.is_funding_related());
        assert!(!TransportError::Unreachable("connection reset".to_string()).is_funding_related());
    }
}
