use crate::peer::Peer;
use serde::{Deserialize, Serialize};

/// Push notifications from the native sync backend.
///
/// Each variant is an independent channel: delivery order is guaranteed
/// within a variant but not across variants, and none of them is
/// acknowledged. A peer-list update may well arrive after a connection
/// event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SyncEvent {
    /// Full replacement for the list of discoverable peers
    Peers(Vec<Peer>),
    /// A connection to the named peer is up
    Connected { name: String },
    /// The active connection has dropped
    Disconnected,
    /// The peer pushed its clipboard contents
    RemoteClipboard { text: String },
    /// The peer pushed a file; `data` is an opaque encoded blob
    RemoteFile { name: String, data: String },
    /// The peer asked this device to bring its own window to front
    BringToFront,
}
