use remotesync_core::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("No received file at index {0}")]
    UnknownFile(usize),

    #[error("Can only connect while browsing")]
    NotBrowsing,
}

pub type Result<T> = std::result::Result<T, SessionError>;
