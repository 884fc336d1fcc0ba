use crate::error::TransportError;
use async_trait::async_trait;
use mailbox_session_core::{ActorId, Member, SessionId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the relay hands back when a session is established
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session identifier
    pub session_id: SessionId,

    /// Mailbox actor all session messages are addressed to
    pub mailbox: ActorId,

    /// Our own relay address within the session
    pub local_actor: ActorId,

    /// Lobby name
    pub name: String,

    /// Join code handed out by the relay, if any
    pub join_code: Option<String>,

    /// Maximum member count the relay accepted
    pub member_limit: u8,

    /// Members present at establishment time
    pub members: Vec<Member>,
}

/// One lobby surfaced by an active search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnnouncement {
    pub session_id: SessionId,
    pub name: String,

    /// Discovery anchor to join the lobby by
    pub anchor: String,

    pub member_count: u8,
    pub member_limit: u8,
}

/// Callback invoked for each lobby matched by a search
pub type MatchCallback = Box<dyn Fn(SessionAnnouncement) + Send + Sync>;

/// Handle releasing a lobby search subscription
///
/// Unsubscribes on explicit call or on drop.
pub struct SearchHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SearchHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        SearchHandle {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Release the subscription immediately
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for SearchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// The mailbox relay as seen by this crate (allows mocking in tests)
///
/// An asynchronous, at-least-once, cost-bearing delivery channel.
/// Implementations own the cryptography and entropy; this seam only
/// covers what coordination needs.
#[async_trait]
pub trait MailboxTransport: Send + Sync {
    /// Open a lobby mailbox and announce it
    async fn create_session(
        &self,
        name: &str,
        display_name: &str,
        member_limit: u8,
    ) -> Result<SessionInfo, TransportError>;

    /// Join a lobby through its discovery anchor
    async fn join_session(
        &self,
        anchor: &str,
        display_name: &str,
    ) -> Result<SessionInfo, TransportError>;

    /// Close a hosted session
    async fn close_session(&self, session: &SessionId) -> Result<(), TransportError>;

    /// Leave a joined session
    async fn leave_session(&self, session: &SessionId) -> Result<(), TransportError>;

    /// Place one message on the relay. Single attempt; costs funding.
    async fn send_message(&self, target: &ActorId, payload: &str) -> Result<(), TransportError>;

    /// Spendable funding units
    async fn get_balance(&self) -> Result<u64, TransportError>;

    /// Pre-provision funding units for upcoming sends
    async fn prepare_funding(&self) -> Result<(), TransportError>;

    /// Watch for announced lobbies, optionally filtered by name prefix
    fn search_sessions(
        &self,
        prefix: Option<&str>,
        on_match: MatchCallback,
    ) -> Result<SearchHandle, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_unsubscribe_runs_cancel_once() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        let handle = SearchHandle::new(move || flag.store(true, Ordering::SeqCst));
        handle.unsubscribe();

        assert!(cancelled.load(Ordering::SeqCst));
    }

    #[test]
    fn test_drop_releases_subscription() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();

        {
            let _handle = SearchHandle::new(move || flag.store(true, Ordering::SeqCst));
        }

        assert!(cancelled.load(Ordering::SeqCst));
    }
}
