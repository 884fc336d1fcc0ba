mod runtime;
mod transport;

pub(crate) use runtime::{sleep, spawn_detached};
pub use transport::{MailboxTransport, MatchCallback, SearchHandle, SessionAnnouncement, SessionInfo};
