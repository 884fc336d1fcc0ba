// Domain layer (lobby events)
pub mod domain;

// Application layer (use cases)
pub mod application;

// Infrastructure layer (transport seam, platform runtime)
pub mod infrastructure;

pub mod error;

// Re-exports for convenience
pub use application::{
    spawn_funding_preparation, CoordinatorState, GameStartPlan, LobbyCoordinator,
    ReliableSendPipeline, RetryConfig,
};
pub use domain::{LobbyEvent, RelayNotification};
pub use error::{CoordinatorError, DeliveryError, TransportError};
pub use infrastructure::{
    MailboxTransport, MatchCallback, SearchHandle, SessionAnnouncement, SessionInfo,
};
