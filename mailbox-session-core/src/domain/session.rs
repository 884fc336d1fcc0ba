use crate::domain::{ActorId, Member, SessionId, Timestamp};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Smallest lobby the relay will host
pub const MIN_MEMBER_LIMIT: u8 = 2;

/// Largest lobby the relay will host
pub const MAX_MEMBER_LIMIT: u8 = 8;

/// Clamp a requested member limit into the supported range
pub fn clamp_member_limit(requested: u8) -> u8 {
    requested.clamp(MIN_MEMBER_LIMIT, MAX_MEMBER_LIMIT)
}

/// Lobby session aggregate
///
/// Mirrors the authoritative membership held by the relay: the member
/// list is only mutated from inbound notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LobbySession {
    /// Session identifier (the lobby's relay address)
    id: SessionId,

    /// Mailbox actor all session messages are addressed to
    mailbox: ActorId,

    /// Lobby name
    name: String,

    /// Join code handed out by the relay, if any
    join_code: Option<String>,

    /// Our own relay address within this session
    local_actor: ActorId,

    /// Whether we created the session
    is_host: bool,

    /// Maximum member count, clamped into [MIN_MEMBER_LIMIT, MAX_MEMBER_LIMIT]
    member_limit: u8,

    /// Members in join order
    members: Vec<Member>,

    /// When the session was established locally
    created_at: Timestamp,
}

/// Errors that can occur in session operations
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SessionError {
    #[error("Member not found: {0}")]
    MemberNotFound(ActorId),
}

impl LobbySession {
    /// Establish a session; `requested_limit` is clamped into range
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SessionId,
        mailbox: ActorId,
        name: String,
        join_code: Option<String>,
        local_actor: ActorId,
        is_host: bool,
        requested_limit: u8,
        members: Vec<Member>,
    ) -> Self {
        LobbySession {
            id,
            mailbox,
            name,
            join_code,
            local_actor,
            is_host,
            member_limit: clamp_member_limit(requested_limit),
            members,
            created_at: Timestamp::now(),
        }
    }

    // ===== Getters =====

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn mailbox(&self) -> &ActorId {
        &self.mailbox
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn join_code(&self) -> Option<&str> {
        self.join_code.as_deref()
    }

    pub fn local_actor(&self) -> &ActorId {
        &self.local_actor
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn member_limit(&self) -> u8 {
        self.member_limit
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, actor: &ActorId) -> Option<&Member> {
        self.members.iter().find(|m| m.actor() == actor)
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    // ===== Membership (driven by inbound notifications) =====

    /// Insert or refresh a member. Idempotent: re-adding an identical
    /// member is a no-op. Returns whether the list changed.
    pub fn upsert_member(&mut self, member: Member) -> bool {
        if let Some(existing) = self.members.iter_mut().find(|m| m.actor() == member.actor()) {
            if *existing == member {
                tracing::debug!("member {} already present, skipping", member.actor());
                return false;
            }
            *existing = member;
            return true;
        }

        self.members.push(member);
        true
    }

    /// Remove a member by relay address
    pub fn remove_member(&mut self, actor: &ActorId) -> Result<Member, SessionError> {
        let index = self
            .members
            .iter()
            .position(|m| m.actor() == actor)
            .ok_or_else(|| SessionError::MemberNotFound(actor.clone()))?;

        Ok(self.members.remove(index))
    }

    /// Replace the whole member list (session-updated notification)
    pub fn replace_members(&mut self, members: Vec<Member>) {
        self.members = members;
    }

    /// Update a member's ready flag. Returns whether the flag changed.
    pub fn set_member_ready(&mut self, actor: &ActorId, is_ready: bool) -> Result<bool, SessionError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.actor() == actor)
            .ok_or_else(|| SessionError::MemberNotFound(actor.clone()))?;

        if member.is_ready() == is_ready {
            return Ok(false);
        }

        member.set_ready(is_ready);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session(limit: u8) -> LobbySession {
        let host = Member::new(ActorId::new("relay1host"), "Nova").unwrap();
        LobbySession::new(
            SessionId::new("lobby-1"),
            ActorId::new("relay1lobby"),
            "Arena".to_string(),
            Some("FROG-42".to_string()),
            ActorId::new("relay1host"),
            true,
            limit,
            vec![host],
        )
    }

    #[test]
    fn test_member_limit_clamps_low() {
        assert_eq!(test_session(1).member_limit(), 2);
    }

    #[test]
    fn test_member_limit_clamps_high() {
        assert_eq!(test_session(99).member_limit(), 8);
    }

    #[test]
    fn test_member_limit_in_range_unchanged() {
        assert_eq!(test_session(5).member_limit(), 5);
    }

    #[test]
    fn test_upsert_member_adds() {
        let mut session = test_session(4);
        let guest = Member::new(ActorId::new("relay1guest"), "Bob").unwrap();

        assert!(session.upsert_member(guest.clone()));
        assert_eq!(session.members().len(), 2);
        assert_eq!(session.member(guest.actor()), Some(&guest));
    }

    #[test]
    fn test_upsert_member_is_idempotent() {
        let mut session = test_session(4);
        let guest = Member::new(ActorId::new("relay1guest"), "Bob").unwrap();

        assert!(session.upsert_member(guest.clone()));
        assert!(!session.upsert_member(guest));
        assert_eq!(session.members().len(), 2);
    }

    #[test]
    fn test_upsert_member_refreshes_changed_entry() {
        let mut session = test_session(4);
        let guest = Member::new(ActorId::new("relay1guest"), "Bob").unwrap();
        session.upsert_member(guest);

        let mut renamed = Member::new(ActorId::new("relay1guest"), "Bobby").unwrap();
        renamed.set_ready(true);

        assert!(session.upsert_member(renamed.clone()));
        assert_eq!(session.members().len(), 2);
        assert_eq!(session.member(renamed.actor()), Some(&renamed));
    }

    #[test]
    fn test_remove_member() {
        let mut session = test_session(4);
        let guest = Member::new(ActorId::new("relay1guest"), "Bob").unwrap();
        session.upsert_member(guest.clone());

        let removed = session.remove_member(guest.actor()).unwrap();

        assert_eq!(removed.display_name(), "Bob");
        assert_eq!(session.members().len(), 1);
    }

    #[test]
    fn test_remove_unknown_member() {
        let mut session = test_session(4);
        let stranger = ActorId::new("relay1stranger");

        assert_eq!(
            session.remove_member(&stranger),
            Err(SessionError::MemberNotFound(stranger))
        );
    }

    #[test]
    fn test_set_member_ready() {
        let mut session = test_session(4);
        let host_actor = ActorId::new("relay1host");

        assert_eq!(session.set_member_ready(&host_actor, true), Ok(true));
        assert!(session.member(&host_actor).unwrap().is_ready());

        // Same flag again reports no change
        assert_eq!(session.set_member_ready(&host_actor, true), Ok(false));
    }

    #[test]
    fn test_replace_members() {
        let mut session = test_session(4);
        let replacement = vec![
            Member::new(ActorId::new("relay1carol"), "Carol").unwrap(),
            Member::new(ActorId::new("relay1dave"), "Dave").unwrap(),
        ];

        session.replace_members(replacement.clone());

        assert_eq!(session.members(), replacement.as_slice());
    }
}
