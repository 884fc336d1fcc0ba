use crate::infrastructure::SessionAnnouncement;
use mailbox_session_core::{ActorId, Member, SessionId, Timestamp};
use uuid::Uuid;

/// Raw notifications delivered by the relay's inbound stream
///
/// Each carries the session it belongs to and the relay timestamp.
/// Message payloads arrive as untyped text and are validated at the
/// coordinator boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayNotification {
    MemberJoined {
        session: SessionId,
        member: Member,
        timestamp: Timestamp,
    },
    MemberLeft {
        session: SessionId,
        actor: ActorId,
        timestamp: Timestamp,
    },
    SessionUpdated {
        session: SessionId,
        members: Vec<Member>,
        timestamp: Timestamp,
    },
    SessionClosed {
        session: SessionId,
        reason: Option<String>,
        timestamp: Timestamp,
    },
    MessageReceived {
        session: SessionId,
        from: ActorId,
        payload: String,
        timestamp: Timestamp,
    },
}

/// Lobby-domain events republished by the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum LobbyEvent {
    /// We created a lobby and are hosting it
    Created {
        session_id: SessionId,
        name: String,
        join_code: Option<String>,
        members: Vec<Member>,
    },

    /// We joined somebody else's lobby
    Joined {
        session_id: SessionId,
        name: String,
        members: Vec<Member>,
    },

    /// An active search matched a lobby
    SessionFound { announcement: SessionAnnouncement },

    MemberJoined { member: Member },

    MemberLeft { actor: ActorId },

    SessionUpdated { members: Vec<Member> },

    SessionClosed { reason: Option<String> },

    ChatReceived {
        from: ActorId,
        text: String,
        timestamp: Timestamp,
    },

    ReadyStateReceived {
        from: ActorId,
        is_ready: bool,
        timestamp: Timestamp,
    },

    GameStartReceived {
        from: ActorId,
        game_id: Uuid,
        start_marker: u64,
        seed: u64,
        timestamp: Timestamp,
    },

    GameAbortReceived {
        from: ActorId,
        reason: String,
        timestamp: Timestamp,
    },

    /// Emitted locally right after our own game-start send succeeds
    GameStarted {
        game_id: Uuid,
        start_marker: u64,
        seed: u64,
    },

    /// A best-effort operation failed; carried here instead of thrown
    Error { context: String, message: String },
}
