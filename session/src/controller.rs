use crate::error::{Result, SessionError};
use crate::session::SessionStatus;
use crate::state::{ControllerState, ReceivedFile};
use parking_lot::Mutex;
use remotesync_core::{Peer, Platform, SyncBridge, SyncEvent};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Shown when the backend cannot resolve the device name.
const HOST_NAME_FALLBACK: &str = "This Mac";

/// How long the "connection successful" banner stays up.
const CONNECTION_SUCCESS_TIMEOUT: Duration = Duration::from_millis(4000);

/// Owns the session state and reconciles it from both directions: user
/// actions issue backend commands and apply their outcomes, while
/// [`apply_event`](Self::apply_event) folds in the backend's push
/// notifications. The rendering layer reads snapshots and calls the action
/// methods; it never mutates state directly.
pub struct SessionController {
    bridge: Arc<dyn SyncBridge>,
    platform: Arc<dyn Platform>,
    state: Arc<Mutex<ControllerState>>,
    banner_timer: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(bridge: Arc<dyn SyncBridge>, platform: Arc<dyn Platform>) -> Self {
        Self {
            bridge,
            platform,
            state: Arc::new(Mutex::new(ControllerState::default())),
            banner_timer: Mutex::new(None),
        }
    }

    /// Fetch this device's display name. A failure falls back to a
    /// placeholder; the name is cosmetic and never worth an error.
    pub async fn init(&self) {
        let name = match self.bridge.get_host_name().await {
            Ok(name) => name,
            Err(e) => {
                debug!("Host name unavailable: {}", e);
                HOST_NAME_FALLBACK.to_string()
            }
        };
        self.state.lock().host_name = name;
    }

    /// A point-in-time copy of everything the rendering layer shows.
    pub fn snapshot(&self) -> ControllerState {
        self.state.lock().clone()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.lock().session.status()
    }

    pub fn host_name(&self) -> String {
        self.state.lock().host_name.clone()
    }

    pub fn peers(&self) -> Vec<Peer> {
        self.state.lock().peers.clone()
    }

    pub fn received_files(&self) -> Vec<ReceivedFile> {
        self.state.lock().received_files.clone()
    }

    pub fn clipboard_sync_enabled(&self) -> bool {
        self.state.lock().clipboard.sync_enabled
    }

    /// Advertise this device so peers can find it.
    pub async fn start_hosting(&self) -> Result<()> {
        if let Err(e) = self.bridge.start_host().await {
            error!("Failed to start hosting: {}", e);
            return Err(e.into());
        }
        self.state.lock().session.host_started();
        Ok(())
    }

    pub async fn stop_hosting(&self) -> Result<()> {
        if let Err(e) = self.bridge.stop_host().await {
            error!("Failed to stop hosting: {}", e);
            return Err(e.into());
        }
        self.state.lock().session.host_stopped();
        Ok(())
    }

    /// Start scanning for peers. Clears the peer list and any leftover
    /// connection error from a previous scan.
    pub async fn start_browsing(&self) -> Result<()> {
        if let Err(e) = self.bridge.start_browse().await {
            error!("Failed to start browsing: {}", e);
            return Err(e.into());
        }
        let mut state = self.state.lock();
        state.session.browse_started();
        state.peers.clear();
        Ok(())
    }

    pub async fn stop_browsing(&self) -> Result<()> {
        if let Err(e) = self.bridge.stop_browse().await {
            error!("Failed to stop browsing: {}", e);
            return Err(e.into());
        }
        let mut state = self.state.lock();
        state.session.browse_stopped();
        state.peers.clear();
        Ok(())
    }

    /// Dial a discovered peer. The session shows `Connecting` until the
    /// backend either pushes [`SyncEvent::Connected`] or the dial command
    /// fails; on failure the terminal message lands in
    /// `last_connection_error` and the session drops back to `Browsing` so
    /// the user can pick another peer without rescanning.
    pub async fn connect_to(&self, peer: &Peer) -> Result<()> {
        {
            let mut state = self.state.lock();
            // One dial at a time; a second attempt has to wait for the
            // first to resolve.
            if state.session.status() != SessionStatus::Browsing {
                return Err(SessionError::NotBrowsing);
            }
            state.session.dial_started(&peer.name);
        }
        info!("Connecting to {} ({}:{})", peer.name, peer.host, peer.port);

        if let Err(e) = self.bridge.connect_to(&peer.host, peer.port).await {
            let message = e.to_string();
            let mut state = self.state.lock();
            if state.session.dial_failed(&message) {
                warn!("Connection to {} failed: {}", peer.name, message);
            } else {
                debug!("Ignoring stale dial failure: {}", message);
            }
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<()> {
        if let Err(e) = self.bridge.disconnect().await {
            error!("Failed to disconnect: {}", e);
            return Err(e.into());
        }
        self.state.lock().session.peer_disconnected();
        Ok(())
    }

    /// Toggle whether inbound clipboard pushes are applied locally. Missed
    /// pushes are not replayed when re-enabling.
    pub fn set_clipboard_sync(&self, enabled: bool) {
        info!("Clipboard sync {}", if enabled { "enabled" } else { "disabled" });
        self.state.lock().clipboard.sync_enabled = enabled;
    }

    /// Read the local clipboard and push it to the peer. The sync gate only
    /// governs inbound pushes; sending works either way. An empty clipboard
    /// sends nothing.
    pub async fn send_clipboard(&self) -> Result<()> {
        let text = self.platform.read_clipboard().await?;
        if text.is_empty() {
            return Ok(());
        }
        self.bridge.send_clipboard(&text).await?;
        Ok(())
    }

    /// Re-apply the last received remote text to the local clipboard. A
    /// no-op when nothing has been received yet.
    pub async fn paste_from_remote(&self) {
        let text = self.state.lock().clipboard.last_remote_text.clone();
        let Some(text) = text else { return };
        if let Err(e) = self.platform.write_clipboard(&text).await {
            warn!("Failed to write clipboard: {}", e);
        }
    }

    /// Ask the connected peer to bring its window to front.
    pub async fn request_peer_focus(&self) -> Result<()> {
        self.bridge.send_bring_to_front().await?;
        Ok(())
    }

    /// Let the user pick a file and send it. `transferring` is set for the
    /// whole round-trip so the rendering layer can disable the action.
    pub async fn pick_and_send_file(&self) -> Result<()> {
        self.state.lock().transferring = true;
        let result = self.bridge.pick_and_send_file().await;
        self.state.lock().transferring = false;
        if let Err(e) = &result {
            error!("File send failed: {}", e);
        }
        result.map_err(Into::into)
    }

    /// Capture a screen region and send it; `screenshotting` covers the
    /// round-trip. A cancelled capture surfaces as a command failure.
    pub async fn capture_screenshot_and_send(&self) -> Result<()> {
        self.state.lock().screenshotting = true;
        let result = self.bridge.capture_screenshot_and_send().await;
        self.state.lock().screenshotting = false;
        if let Err(e) = &result {
            error!("Screenshot send failed: {}", e);
        }
        result.map_err(Into::into)
    }

    /// Save the received file at `index` through the backend's save dialog.
    /// Resolves `Ok(None)` when the user dismisses the dialog; the entry
    /// stays in the queue either way and can be saved again.
    pub async fn save_received_file(&self, index: usize) -> Result<Option<PathBuf>> {
        let file = self
            .state
            .lock()
            .received_files
            .get(index)
            .cloned()
            .ok_or(SessionError::UnknownFile(index))?;
        let path = self.bridge.save_received_file(&file.name, &file.data).await?;
        Ok(path)
    }

    /// Save then open the received file at `index`. A cancelled save dialog
    /// skips the open.
    pub async fn open_received_file(&self, index: usize) -> Result<()> {
        let Some(path) = self.save_received_file(index).await? else {
            return Ok(());
        };
        self.platform.open_path(&path).await?;
        Ok(())
    }

    /// Apply one backend push notification.
    ///
    /// Handlers only look at the current state and make no assumption about
    /// what arrived before, so the independent channels may interleave
    /// freely with each other and with in-flight commands.
    pub async fn apply_event(&self, event: SyncEvent) {
        match event {
            SyncEvent::Peers(peers) => {
                debug!("Peer list updated: {} peers", peers.len());
                // Replace, not merge: stale entries from a previous scan
                // must not survive.
                self.state.lock().peers = peers;
            }
            SyncEvent::Connected { name } => {
                info!("Connected to {}", name);
                self.state.lock().session.peer_connected(&name);
                self.show_connection_success();
            }
            SyncEvent::Disconnected => {
                info!("Disconnected");
                self.state.lock().session.peer_disconnected();
            }
            SyncEvent::RemoteClipboard { text } => {
                if text.is_empty() {
                    return;
                }
                {
                    let mut state = self.state.lock();
                    // The gate is read here, at delivery time, not captured
                    // at subscription time.
                    if !state.clipboard.sync_enabled {
                        debug!("Clipboard sync off, ignoring remote push");
                        return;
                    }
                    state.clipboard.last_remote_text = Some(text.clone());
                }
                if let Err(e) = self.platform.write_clipboard(&text).await {
                    warn!("Failed to write clipboard: {}", e);
                }
            }
            SyncEvent::RemoteFile { name, data } => {
                info!("Received file: {}", name);
                self.state
                    .lock()
                    .received_files
                    .push(ReceivedFile { name, data });
            }
            SyncEvent::BringToFront => {
                if let Err(e) = self.platform.focus_window().await {
                    warn!("Failed to focus window: {}", e);
                }
            }
        }
    }

    /// Show the "connection successful" banner and (re)arm its auto-clear.
    /// One timer at a time: arming aborts the previous handle, and the
    /// epoch stops a timer that already slept through its delay from
    /// clearing a banner armed after it.
    fn show_connection_success(&self) {
        let epoch = {
            let mut state = self.state.lock();
            state.show_connection_success = true;
            state.banner_epoch += 1;
            state.banner_epoch
        };

        let mut slot = self.banner_timer.lock();
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        let state = Arc::clone(&self.state);
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(CONNECTION_SUCCESS_TIMEOUT).await;
            let mut state = state.lock();
            if state.banner_epoch == epoch {
                state.show_connection_success = false;
            }
        }));
    }

    /// Start the reconciler task: subscribes to the backend's push bus and
    /// applies events in delivery order until the returned handle is
    /// stopped or dropped. One subscription per controller scope; it is
    /// not torn down or re-created when the clipboard gate toggles.
    pub fn spawn_event_loop(self: Arc<Self>) -> EventLoopHandle {
        let mut events = self.bridge.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => self.apply_event(event).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!("Event bus lagged, {} events dropped", missed);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        EventLoopHandle { task }
    }
}

/// Owns the reconciler task; the subscription dies with it. Dropping the
/// handle aborts the task, so no listener outlives its scope.
pub struct EventLoopHandle {
    task: JoinHandle<()>,
}

impl EventLoopHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for EventLoopHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remotesync_core::{IssuedCommand, MockBridge, MockPlatform};

    fn setup() -> (MockBridge, MockPlatform, SessionController) {
        let bridge = MockBridge::new();
        let platform = MockPlatform::new();
        let controller =
            SessionController::new(Arc::new(bridge.clone()), Arc::new(platform.clone()));
        (bridge, platform, controller)
    }

    async fn browsing_controller() -> (MockBridge, MockPlatform, SessionController) {
        let (bridge, platform, controller) = setup();
        controller.start_browsing().await.unwrap();
        (bridge, platform, controller)
    }

    #[tokio::test]
    async fn test_init_fetches_host_name() {
        let (bridge, _, controller) = setup();
        bridge.set_host_name("Office Mac");

        controller.init().await;
        assert_eq!(controller.host_name(), "Office Mac");
    }

    #[tokio::test]
    async fn test_init_falls_back_to_placeholder() {
        let (bridge, _, controller) = setup();
        bridge.fail_next("no hostname");

        controller.init().await;
        assert_eq!(controller.host_name(), "This Mac");
    }

    #[tokio::test]
    async fn test_start_hosting() {
        let (bridge, _, controller) = setup();

        controller.start_hosting().await.unwrap();
        assert_eq!(controller.status(), SessionStatus::Hosting);
        assert_eq!(bridge.issued(), vec![IssuedCommand::StartHost]);

        controller.stop_hosting().await.unwrap();
        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_failed_start_hosting_stays_idle() {
        let (bridge, _, controller) = setup();
        bridge.fail_next("Already running");

        assert!(controller.start_hosting().await.is_err());
        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_start_browsing_clears_peers_and_error() {
        let (bridge, _, controller) = browsing_controller().await;
        controller
            .apply_event(SyncEvent::Peers(vec![Peer::new("A", "10.0.0.2", 9000)]))
            .await;
        bridge.fail_next("timeout");
        let _ = controller.connect_to(&Peer::new("A", "10.0.0.2", 9000)).await;

        controller.stop_browsing().await.unwrap();
        controller.start_browsing().await.unwrap();

        let state = controller.snapshot();
        assert!(state.peers.is_empty());
        assert!(state.session.last_connection_error().is_none());
        assert_eq!(state.session.status(), SessionStatus::Browsing);
    }

    #[tokio::test]
    async fn test_connect_dials_and_waits_for_event() {
        let (bridge, _, controller) = browsing_controller().await;
        let peer = Peer::new("A", "10.0.0.2", 9000);

        controller.connect_to(&peer).await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.session.status(), SessionStatus::Connecting);
        assert_eq!(state.session.connecting_peer(), Some("A"));
        assert_eq!(
            bridge.last_issued(),
            Some(IssuedCommand::ConnectTo {
                host: "10.0.0.2".to_string(),
                port: 9000
            })
        );

        controller
            .apply_event(SyncEvent::Connected {
                name: "A".to_string(),
            })
            .await;
        let state = controller.snapshot();
        assert_eq!(state.session.status(), SessionStatus::Connected);
        assert_eq!(state.session.connected_peer(), Some("A"));
        assert!(state.show_connection_success);
    }

    #[tokio::test]
    async fn test_connect_failure_surfaces_message_verbatim() {
        let (bridge, _, controller) = browsing_controller().await;
        bridge.fail_next("timeout");

        let result = controller.connect_to(&Peer::new("A", "10.0.0.2", 9000)).await;
        assert!(result.is_err());

        let state = controller.snapshot();
        assert_eq!(state.session.status(), SessionStatus::Browsing);
        assert_eq!(state.session.last_connection_error(), Some("timeout"));
        assert!(state.session.connecting_peer().is_none());
    }

    #[tokio::test]
    async fn test_connect_rejected_unless_browsing() {
        let (_, _, controller) = setup();

        let result = controller.connect_to(&Peer::new("A", "10.0.0.2", 9000)).await;
        assert!(matches!(result, Err(SessionError::NotBrowsing)));
        assert_eq!(controller.status(), SessionStatus::Idle);
    }

    #[tokio::test]
    async fn test_second_dial_rejected_while_connecting() {
        let (_, _, controller) = browsing_controller().await;
        controller
            .connect_to(&Peer::new("A", "10.0.0.2", 9000))
            .await
            .unwrap();

        let result = controller.connect_to(&Peer::new("B", "10.0.0.3", 9000)).await;
        assert!(matches!(result, Err(SessionError::NotBrowsing)));
        assert_eq!(controller.snapshot().session.connecting_peer(), Some("A"));
    }

    #[tokio::test]
    async fn test_disconnect_returns_to_idle() {
        let (bridge, _, controller) = setup();
        controller
            .apply_event(SyncEvent::Connected {
                name: "A".to_string(),
            })
            .await;

        controller.disconnect().await.unwrap();
        assert_eq!(controller.status(), SessionStatus::Idle);
        assert_eq!(bridge.last_issued(), Some(IssuedCommand::Disconnect));
    }

    #[tokio::test(start_paused = true)]
    async fn test_banner_clears_after_timeout() {
        let (_, _, controller) = setup();
        controller
            .apply_event(SyncEvent::Connected {
                name: "A".to_string(),
            })
            .await;
        assert!(controller.snapshot().show_connection_success);

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(controller.snapshot().show_connection_success);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(!controller.snapshot().show_connection_success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_rearms_banner_timer() {
        let (_, _, controller) = setup();
        controller
            .apply_event(SyncEvent::Connected {
                name: "A".to_string(),
            })
            .await;

        tokio::time::sleep(Duration::from_millis(2000)).await;
        controller
            .apply_event(SyncEvent::Connected {
                name: "B".to_string(),
            })
            .await;

        // The first timer's deadline passes without clearing anything
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(controller.snapshot().show_connection_success);

        // The second timer's deadline does
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert!(!controller.snapshot().show_connection_success);
    }

    #[tokio::test]
    async fn test_remote_clipboard_applied_when_gate_open() {
        let (_, platform, controller) = setup();

        controller
            .apply_event(SyncEvent::RemoteClipboard {
                text: "hello".to_string(),
            })
            .await;

        let state = controller.snapshot();
        assert_eq!(state.clipboard.last_remote_text.as_deref(), Some("hello"));
        assert_eq!(platform.last_written().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_remote_clipboard_ignored_when_gate_closed() {
        let (_, platform, controller) = setup();
        controller
            .apply_event(SyncEvent::RemoteClipboard {
                text: "before".to_string(),
            })
            .await;

        controller.set_clipboard_sync(false);
        controller
            .apply_event(SyncEvent::RemoteClipboard {
                text: "after".to_string(),
            })
            .await;

        let state = controller.snapshot();
        assert_eq!(state.clipboard.last_remote_text.as_deref(), Some("before"));
        assert_eq!(platform.written(), vec!["before".to_string()]);
    }

    #[tokio::test]
    async fn test_reenabling_gate_does_not_replay_missed_push() {
        let (_, platform, controller) = setup();
        controller.set_clipboard_sync(false);
        controller
            .apply_event(SyncEvent::RemoteClipboard {
                text: "missed".to_string(),
            })
            .await;

        controller.set_clipboard_sync(true);
        assert!(controller.snapshot().clipboard.last_remote_text.is_none());
        assert!(platform.written().is_empty());
    }

    #[tokio::test]
    async fn test_empty_remote_clipboard_ignored() {
        let (_, platform, controller) = setup();

        controller
            .apply_event(SyncEvent::RemoteClipboard {
                text: String::new(),
            })
            .await;

        assert!(controller.snapshot().clipboard.last_remote_text.is_none());
        assert!(platform.written().is_empty());
    }

    #[tokio::test]
    async fn test_send_clipboard_reads_local() {
        let (bridge, platform, controller) = setup();
        platform.set_clipboard_text("from here");

        controller.send_clipboard().await.unwrap();
        assert_eq!(
            bridge.last_issued(),
            Some(IssuedCommand::SendClipboard("from here".to_string()))
        );
    }

    #[tokio::test]
    async fn test_send_clipboard_skips_empty() {
        let (bridge, _, controller) = setup();

        controller.send_clipboard().await.unwrap();
        assert!(bridge.issued().is_empty());
    }

    #[tokio::test]
    async fn test_send_clipboard_ignores_gate() {
        let (bridge, platform, controller) = setup();
        controller.set_clipboard_sync(false);
        platform.set_clipboard_text("outbound");

        controller.send_clipboard().await.unwrap();
        assert_eq!(bridge.issued().len(), 1);
    }

    #[tokio::test]
    async fn test_paste_from_remote_noop_without_text() {
        let (_, platform, controller) = setup();

        controller.paste_from_remote().await;
        assert!(platform.written().is_empty());
    }

    #[tokio::test]
    async fn test_paste_from_remote_rewrites_last_text() {
        let (_, platform, controller) = setup();
        controller
            .apply_event(SyncEvent::RemoteClipboard {
                text: "hello".to_string(),
            })
            .await;

        controller.paste_from_remote().await;
        assert_eq!(platform.written(), vec!["hello".to_string(), "hello".to_string()]);
    }

    #[tokio::test]
    async fn test_peer_list_replaced_wholesale() {
        let (_, _, controller) = setup();
        controller
            .apply_event(SyncEvent::Peers(vec![
                Peer::new("A", "10.0.0.2", 9000),
                Peer::new("B", "10.0.0.3", 9000),
            ]))
            .await;

        controller
            .apply_event(SyncEvent::Peers(vec![Peer::new("C", "10.0.0.4", 9000)]))
            .await;

        let peers = controller.peers();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0].name, "C");
    }

    #[tokio::test]
    async fn test_received_files_append_in_order() {
        let (_, _, controller) = setup();
        for i in 0..3 {
            controller
                .apply_event(SyncEvent::RemoteFile {
                    name: format!("file-{}.txt", i),
                    data: "AAAA".to_string(),
                })
                .await;
        }

        let files = controller.received_files();
        assert_eq!(files.len(), 3);
        assert_eq!(files[0].name, "file-0.txt");
        assert_eq!(files[2].name, "file-2.txt");
    }

    #[tokio::test]
    async fn test_bring_to_front_delegates_to_platform() {
        let (_, platform, controller) = setup();

        controller.apply_event(SyncEvent::BringToFront).await;
        assert_eq!(platform.focus_requests(), 1);
    }

    #[tokio::test]
    async fn test_request_peer_focus() {
        let (bridge, _, controller) = setup();

        controller.request_peer_focus().await.unwrap();
        assert_eq!(bridge.last_issued(), Some(IssuedCommand::SendBringToFront));
    }

    #[tokio::test]
    async fn test_save_received_file_returns_path() {
        let (bridge, _, controller) = setup();
        controller
            .apply_event(SyncEvent::RemoteFile {
                name: "notes.txt".to_string(),
                data: "AAAA".to_string(),
            })
            .await;
        bridge.queue_save_result(Some(PathBuf::from("/downloads/notes.txt")));

        let path = controller.save_received_file(0).await.unwrap();
        assert_eq!(path, Some(PathBuf::from("/downloads/notes.txt")));
        assert_eq!(
            bridge.last_issued(),
            Some(IssuedCommand::SaveReceivedFile {
                name: "notes.txt".to_string()
            })
        );
        // Saving never consumes the entry
        assert_eq!(controller.received_files().len(), 1);
    }

    #[tokio::test]
    async fn test_save_cancelled_is_silent() {
        let (_, _, controller) = setup();
        controller
            .apply_event(SyncEvent::RemoteFile {
                name: "notes.txt".to_string(),
                data: "AAAA".to_string(),
            })
            .await;

        let path = controller.save_received_file(0).await.unwrap();
        assert_eq!(path, None);
    }

    #[tokio::test]
    async fn test_open_skipped_when_save_cancelled() {
        let (_, platform, controller) = setup();
        controller
            .apply_event(SyncEvent::RemoteFile {
                name: "notes.txt".to_string(),
                data: "AAAA".to_string(),
            })
            .await;

        controller.open_received_file(0).await.unwrap();
        assert!(platform.opened().is_empty());
    }

    #[tokio::test]
    async fn test_open_after_save() {
        let (bridge, platform, controller) = setup();
        controller
            .apply_event(SyncEvent::RemoteFile {
                name: "notes.txt".to_string(),
                data: "AAAA".to_string(),
            })
            .await;
        bridge.queue_save_result(Some(PathBuf::from("/downloads/notes.txt")));

        controller.open_received_file(0).await.unwrap();
        assert_eq!(platform.opened(), vec![PathBuf::from("/downloads/notes.txt")]);
    }

    #[tokio::test]
    async fn test_save_unknown_index() {
        let (_, _, controller) = setup();

        let result = controller.save_received_file(3).await;
        assert!(matches!(result, Err(SessionError::UnknownFile(3))));
    }

    #[tokio::test]
    async fn test_busy_flags_reset_after_failure() {
        let (bridge, _, controller) = setup();

        bridge.fail_next("no peer");
        assert!(controller.pick_and_send_file().await.is_err());
        assert!(!controller.snapshot().transferring);

        bridge.fail_next("capture failed");
        assert!(controller.capture_screenshot_and_send().await.is_err());
        assert!(!controller.snapshot().screenshotting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_loop_applies_and_stops() {
        let (bridge, _, controller) = setup();
        let controller = Arc::new(controller);
        let handle = controller.clone().spawn_event_loop();

        bridge.emit(SyncEvent::RemoteFile {
            name: "a.txt".to_string(),
            data: "AAAA".to_string(),
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(controller.received_files().len(), 1);

        handle.stop();
        tokio::time::sleep(Duration::from_millis(1)).await;
        bridge.emit(SyncEvent::RemoteFile {
            name: "b.txt".to_string(),
            data: "AAAA".to_string(),
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(controller.received_files().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_event_loop() {
        let (bridge, _, controller) = setup();
        let controller = Arc::new(controller);
        let handle = controller.clone().spawn_event_loop();
        drop(handle);
        tokio::time::sleep(Duration::from_millis(1)).await;

        bridge.emit(SyncEvent::Peers(vec![Peer::new("A", "10.0.0.2", 9000)]));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(controller.peers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gate_toggle_does_not_resubscribe() {
        let (bridge, platform, controller) = setup();
        let controller = Arc::new(controller);
        let _handle = controller.clone().spawn_event_loop();

        // Flip the gate a few times; the single subscription keeps working
        // and nothing is delivered twice.
        controller.set_clipboard_sync(false);
        controller.set_clipboard_sync(true);
        controller.set_clipboard_sync(false);
        controller.set_clipboard_sync(true);

        bridge.emit(SyncEvent::RemoteClipboard {
            text: "once".to_string(),
        });
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(platform.written(), vec!["once".to_string()]);
    }
}
