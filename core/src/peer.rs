use serde::{Deserialize, Serialize};

/// A peer advertised on the local network.
///
/// `name` is a display label and is not guaranteed unique; two entries refer
/// to the same endpoint iff they agree on `(host, port)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl Peer {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
        }
    }

    /// Endpoint identity: `(host, port)`, ignoring the display name.
    pub fn same_endpoint(&self, other: &Peer) -> bool {
        self.host == other.host && self.port == other.port
    }
}
