use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Terminal failure of a dial. The message is what the backend reports
    /// after its retry loop gives up, shown to the user as-is.
    #[error("{0}")]
    Connection(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Already running")]
    AlreadyRunning,

    #[error("Host name unavailable: {0}")]
    HostName(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
