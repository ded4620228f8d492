use crate::session::Session;
use remotesync_core::Peer;

/// A file pushed by the peer. `data` stays in its encoded wire form; the
/// backend decodes it when the user saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub name: String,
    pub data: String,
}

/// Inbound clipboard handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardState {
    /// Gate for applying remote pushes locally. Outbound sends ignore it,
    /// and flipping it back on does not replay missed pushes.
    pub sync_enabled: bool,
    /// Last remote text that passed the gate.
    pub last_remote_text: Option<String>,
}

impl Default for ClipboardState {
    fn default() -> Self {
        Self {
            sync_enabled: true,
            last_remote_text: None,
        }
    }
}

/// Everything the rendering layer reads.
///
/// Mutated only by the controller's action methods and the event reconciler;
/// consumers get clones and never write back.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub session: Session,
    /// This device's display name; a placeholder when the backend cannot
    /// resolve it.
    pub host_name: String,
    /// Discoverable peers, replaced wholesale on every update.
    pub peers: Vec<Peer>,
    pub clipboard: ClipboardState,
    /// Inbound files in arrival order. Append-only: saving or opening an
    /// entry never removes it.
    pub received_files: Vec<ReceivedFile>,
    /// The "connection successful" banner, auto-cleared after a few seconds.
    pub show_connection_success: bool,
    /// A file pick-and-send round-trip is in flight.
    pub transferring: bool,
    /// A screenshot capture-and-send round-trip is in flight.
    pub screenshotting: bool,
    /// Bumped each time the banner is armed; a stale timer whose epoch no
    /// longer matches must not clear the banner.
    pub(crate) banner_epoch: u64,
}
