pub mod domain;

pub use domain::{
    clamp_member_limit, ActionCode, ActorId, LobbySession, Member, MemberError, MessageError,
    MoveAction, MoveEvent, MoveEventError, MoveOutcome, OpponentConfig, OpponentReconciler,
    SessionError, SessionId, SessionMessage, Timestamp, DEFAULT_COIN_VALUE,
    DEFAULT_STARTING_COINS, MAX_MEMBER_LIMIT, MIN_MEMBER_LIMIT, NO_CHANGE_SENTINEL,
};
