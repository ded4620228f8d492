/// Connection lifecycle states. `Idle` is the resting state; every other
/// state can get back to it through an explicit stop/disconnect or a
/// backend-signaled drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Hosting,
    Browsing,
    Connecting,
    Connected,
}

/// The connection lifecycle machine.
///
/// Fields are private so every mutation goes through a transition method.
/// At most one of the connecting/connected peer names is set at any time,
/// and always the one `status` calls for.
#[derive(Debug, Clone, Default)]
pub struct Session {
    status: SessionStatus,
    connecting_peer: Option<String>,
    connected_peer: Option<String>,
    last_connection_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The peer being dialed; present iff `Connecting`.
    pub fn connecting_peer(&self) -> Option<&str> {
        self.connecting_peer.as_deref()
    }

    /// The connected peer; present iff `Connected`.
    pub fn connected_peer(&self) -> Option<&str> {
        self.connected_peer.as_deref()
    }

    /// Terminal message of the last failed dial. Cleared when a new dial
    /// starts, a connection comes up, or browsing starts/stops.
    pub fn last_connection_error(&self) -> Option<&str> {
        self.last_connection_error.as_deref()
    }

    pub(crate) fn host_started(&mut self) {
        if self.status == SessionStatus::Idle {
            self.status = SessionStatus::Hosting;
        }
    }

    pub(crate) fn host_stopped(&mut self) {
        if self.status == SessionStatus::Hosting {
            self.status = SessionStatus::Idle;
        }
    }

    pub(crate) fn browse_started(&mut self) {
        if self.status == SessionStatus::Idle {
            self.status = SessionStatus::Browsing;
            self.last_connection_error = None;
        }
    }

    pub(crate) fn browse_stopped(&mut self) {
        if self.status == SessionStatus::Browsing {
            self.status = SessionStatus::Idle;
            self.last_connection_error = None;
        }
    }

    /// A dial is in flight for `peer_name`. Only ever entered from
    /// `Browsing`; the caller checks that under the same lock.
    pub(crate) fn dial_started(&mut self, peer_name: &str) {
        self.status = SessionStatus::Connecting;
        self.connecting_peer = Some(peer_name.to_string());
        self.connected_peer = None;
        self.last_connection_error = None;
    }

    /// Terminal failure of the dial command. Applies only while still
    /// `Connecting`: if a connection or disconnection event was reconciled
    /// while the command was in flight, that outcome stands and the failure
    /// is stale (returns false).
    pub(crate) fn dial_failed(&mut self, message: &str) -> bool {
        if self.status != SessionStatus::Connecting {
            return false;
        }
        self.status = SessionStatus::Browsing;
        self.connecting_peer = None;
        self.last_connection_error = Some(message.to_string());
        true
    }

    /// A connection is up. Authoritative from any state: only one connection
    /// can exist, so the event is not checked against the peer that was
    /// being dialed.
    pub(crate) fn peer_connected(&mut self, name: &str) {
        self.status = SessionStatus::Connected;
        self.connected_peer = Some(name.to_string());
        self.connecting_peer = None;
        self.last_connection_error = None;
    }

    /// The connection dropped, or the user asked to disconnect. Forces
    /// `Idle` from any state.
    pub(crate) fn peer_disconnected(&mut self) {
        self.status = SessionStatus::Idle;
        self.connected_peer = None;
        self.connecting_peer = None;
    }
}
