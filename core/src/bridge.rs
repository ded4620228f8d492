use crate::error::Result;
use crate::events::SyncEvent;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// Command boundary to the native sync backend.
///
/// Every call is an asynchronous round-trip resolving to success or a
/// failure message. Outcomes that arrive out of band (a peer connecting, a
/// pushed clipboard) are delivered as [`SyncEvent`]s on the bus returned by
/// [`subscribe`](SyncBridge::subscribe), not as command results.
#[async_trait]
pub trait SyncBridge: Send + Sync {
    /// This device's advertised name.
    async fn get_host_name(&self) -> Result<String>;

    /// Start advertising this device so peers can find it.
    async fn start_host(&self) -> Result<()>;

    async fn stop_host(&self) -> Result<()>;

    /// Start scanning for advertised peers. Results arrive as
    /// [`SyncEvent::Peers`] updates.
    async fn start_browse(&self) -> Result<()>;

    async fn stop_browse(&self) -> Result<()>;

    /// Dial a peer. `Ok` means the dial was accepted, not that the
    /// connection is up; wait for [`SyncEvent::Connected`]. The backend
    /// owns the retry loop and reports the terminal failure as the error
    /// message.
    async fn connect_to(&self, host: &str, port: u16) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;

    /// Push `text` to the connected peer.
    async fn send_clipboard(&self, text: &str) -> Result<()>;

    /// Ask the connected peer to bring its window to front.
    async fn send_bring_to_front(&self) -> Result<()>;

    /// Let the user pick a file in a native dialog and send it to the peer.
    /// A dismissed dialog resolves `Ok` without sending anything.
    async fn pick_and_send_file(&self) -> Result<()>;

    /// Capture a screen region, encode it and send it to the peer.
    async fn capture_screenshot_and_send(&self) -> Result<()>;

    /// Prompt for a destination and write a received file there. Resolves
    /// `Ok(None)` when the user cancels the dialog.
    async fn save_received_file(&self, name: &str, data: &str) -> Result<Option<PathBuf>>;

    /// Subscribe to the push-event bus. Each receiver sees every event from
    /// the moment it subscribes.
    fn subscribe(&self) -> broadcast::Receiver<SyncEvent>;
}

/// Local-system collaborator: OS clipboard, file opening and window focus.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn read_clipboard(&self) -> Result<String>;

    async fn write_clipboard(&self, text: &str) -> Result<()>;

    /// Open a file with the system default handler.
    async fn open_path(&self, path: &Path) -> Result<()>;

    /// Bring this device's own window to the foreground.
    async fn focus_window(&self) -> Result<()>;
}
