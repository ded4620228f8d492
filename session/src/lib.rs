pub mod controller;
pub mod error;
pub mod session;
pub mod state;

pub use controller::{EventLoopHandle, SessionController};
pub use error::{Result, SessionError};
pub use session::{Session, SessionStatus};
pub use state::{ClipboardState, ControllerState, ReceivedFile};
