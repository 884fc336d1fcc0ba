mod ids;
mod member;
mod message;
mod move_event;
mod opponent;
mod session;

pub use ids::{ActorId, SessionId};
pub use member::{Member, MemberError, Timestamp};
pub use message::{MessageError, SessionMessage};
pub use move_event::{
    ActionCode, MoveAction, MoveEvent, MoveEventError, LEGACY_NAME_CODES, LEGACY_NUMERIC_CODES,
    NO_CHANGE_SENTINEL,
};
pub use opponent::{
    MoveOutcome, OpponentConfig, OpponentReconciler, DEFAULT_COIN_VALUE, DEFAULT_STARTING_COINS,
};
pub use session::{clamp_member_limit, LobbySession, SessionError, MAX_MEMBER_LIMIT, MIN_MEMBER_LIMIT};
