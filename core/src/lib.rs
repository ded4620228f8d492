pub mod bridge;
pub mod error;
pub mod events;
pub mod mock;
pub mod peer;

pub use bridge::{Platform, SyncBridge};
pub use error::{BridgeError, Result};
pub use events::SyncEvent;
pub use mock::{IssuedCommand, MockBridge, MockPlatform};
pub use peer::Peer;
