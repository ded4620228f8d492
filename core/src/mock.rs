//! Mock collaborators for testing.
//!
//! [`MockBridge`] records every issued command and lets tests script
//! failures, save-dialog outcomes and push events. [`MockPlatform`] does the
//! same for the local-system boundary. Clones share state, so a test can
//! keep one handle for assertions and hand another to the controller.

use crate::bridge::{Platform, SyncBridge};
use crate::error::{BridgeError, Result};
use crate::events::SyncEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Commands recorded by [`MockBridge`], in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuedCommand {
    StartHost,
    StopHost,
    StartBrowse,
    StopBrowse,
    ConnectTo { host: String, port: u16 },
    Disconnect,
    SendClipboard(String),
    SendBringToFront,
    PickAndSendFile,
    CaptureScreenshotAndSend,
    SaveReceivedFile { name: String },
}

#[derive(Default)]
struct MockBridgeInner {
    host_name: Option<String>,
    issued: Vec<IssuedCommand>,
    fail_next: Option<String>,
    save_results: VecDeque<Option<PathBuf>>,
}

pub struct MockBridge {
    inner: Arc<Mutex<MockBridgeInner>>,
    event_tx: broadcast::Sender<SyncEvent>,
}

impl MockBridge {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(MockBridgeInner::default())),
            event_tx,
        }
    }

    /// What `get_host_name` resolves to (default `"mock-host"`).
    pub fn set_host_name(&self, name: &str) {
        self.inner.lock().host_name = Some(name.to_string());
    }

    /// Cause the next command (any kind) to fail with this message. The
    /// failed command is not recorded.
    pub fn fail_next(&self, message: &str) {
        self.inner.lock().fail_next = Some(message.to_string());
    }

    /// Queue the outcome of the next `save_received_file` call. With an
    /// empty queue the dialog counts as cancelled (`Ok(None)`).
    pub fn queue_save_result(&self, path: Option<PathBuf>) {
        self.inner.lock().save_results.push_back(path);
    }

    /// Deliver a push event to every subscriber.
    pub fn emit(&self, event: SyncEvent) {
        let _ = self.event_tx.send(event);
    }

    /// All commands issued so far, in order.
    pub fn issued(&self) -> Vec<IssuedCommand> {
        self.inner.lock().issued.clone()
    }

    pub fn last_issued(&self) -> Option<IssuedCommand> {
        self.inner.lock().issued.last().cloned()
    }

    fn command(&self, cmd: IssuedCommand) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(message) = inner.fail_next.take() {
            return Err(BridgeError::Connection(message));
        }
        inner.issued.push(cmd);
        Ok(())
    }
}

impl Default for MockBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockBridge {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            event_tx: self.event_tx.clone(),
        }
    }
}

#[async_trait]
impl SyncBridge for MockBridge {
    async fn get_host_name(&self) -> Result<String> {
        let mut inner = self.inner.lock();
        if let Some(message) = inner.fail_next.take() {
            return Err(BridgeError::HostName(message));
        }
        Ok(inner
            .host_name
            .clone()
            .unwrap_or_else(|| "mock-host".to_string()))
    }

    async fn start_host(&self) -> Result<()> {
        self.command(IssuedCommand::StartHost)
    }

    async fn stop_host(&self) -> Result<()> {
        self.command(IssuedCommand::StopHost)
    }

    async fn start_browse(&self) -> Result<()> {
        self.command(IssuedCommand::StartBrowse)
    }

    async fn stop_browse(&self) -> Result<()> {
        self.command(IssuedCommand::StopBrowse)
    }

    async fn connect_to(&self, host: &str, port: u16) -> Result<()> {
        self.command(IssuedCommand::ConnectTo {
            host: host.to_string(),
            port,
        })
    }

    async fn disconnect(&self) -> Result<()> {
        self.command(IssuedCommand::Disconnect)
    }

    async fn send_clipboard(&self, text: &str) -> Result<()> {
        self.command(IssuedCommand::SendClipboard(text.to_string()))
    }

    async fn send_bring_to_front(&self) -> Result<()> {
        self.command(IssuedCommand::SendBringToFront)
    }

    async fn pick_and_send_file(&self) -> Result<()> {
        self.command(IssuedCommand::PickAndSendFile)
    }

    async fn capture_screenshot_and_send(&self) -> Result<()> {
        self.command(IssuedCommand::CaptureScreenshotAndSend)
    }

    async fn save_received_file(&self, name: &str, _data: &str) -> Result<Option<PathBuf>> {
        self.command(IssuedCommand::SaveReceivedFile {
            name: name.to_string(),
        })?;
        Ok(self.inner.lock().save_results.pop_front().flatten())
    }

    fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.event_tx.subscribe()
    }
}

#[derive(Default)]
struct MockPlatformInner {
    clipboard: String,
    written: Vec<String>,
    opened: Vec<PathBuf>,
    focus_requests: u32,
    fail_next: Option<String>,
}

#[derive(Default)]
pub struct MockPlatform {
    inner: Arc<Mutex<MockPlatformInner>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload the local clipboard for `read_clipboard`.
    pub fn set_clipboard_text(&self, text: &str) {
        self.inner.lock().clipboard = text.to_string();
    }

    /// Everything written to the local clipboard, in order.
    pub fn written(&self) -> Vec<String> {
        self.inner.lock().written.clone()
    }

    pub fn last_written(&self) -> Option<String> {
        self.inner.lock().written.last().cloned()
    }

    /// Every path opened with the system handler.
    pub fn opened(&self) -> Vec<PathBuf> {
        self.inner.lock().opened.clone()
    }

    pub fn focus_requests(&self) -> u32 {
        self.inner.lock().focus_requests
    }

    /// Cause the next platform call to fail with this message.
    pub fn fail_next(&self, message: &str) {
        self.inner.lock().fail_next = Some(message.to_string());
    }

    fn take_failure(&self) -> Option<String> {
        self.inner.lock().fail_next.take()
    }
}

impl Clone for MockPlatform {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn read_clipboard(&self) -> Result<String> {
        if let Some(message) = self.take_failure() {
            return Err(BridgeError::Clipboard(message));
        }
        Ok(self.inner.lock().clipboard.clone())
    }

    async fn write_clipboard(&self, text: &str) -> Result<()> {
        if let Some(message) = self.take_failure() {
            return Err(BridgeError::Clipboard(message));
        }
        let mut inner = self.inner.lock();
        inner.clipboard = text.to_string();
        inner.written.push(text.to_string());
        Ok(())
    }

    async fn open_path(&self, path: &Path) -> Result<()> {
        if let Some(message) = self.take_failure() {
            return Err(BridgeError::Dialog(message));
        }
        self.inner.lock().opened.push(path.to_path_buf());
        Ok(())
    }

    async fn focus_window(&self) -> Result<()> {
        if let Some(message) = self.take_failure() {
            return Err(BridgeError::Dialog(message));
        }
        self.inner.lock().focus_requests += 1;
        Ok(())
    }
}
