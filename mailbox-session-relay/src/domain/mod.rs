mod events;

pub use events::{LobbyEvent, RelayNotification};
