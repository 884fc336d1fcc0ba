mod coordinator;
mod funding;
mod pipeline;

pub use coordinator::{CoordinatorState, GameStartPlan, LobbyCoordinator};
pub use funding::spawn_funding_preparation;
pub use pipeline::{ReliableSendPipeline, RetryConfig};
