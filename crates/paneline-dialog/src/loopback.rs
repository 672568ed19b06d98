//! In-process platform: a parent and its child window inside one process.
//!
//! Messages are queued per direction and only delivered when
//! [`LoopbackWindow::pump`] runs, which models the two independent event
//! loops of a real host while keeping delivery order deterministic.
//! Used by the `paneline` binary and by tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use async_trait::async_trait;
use paneline_common::PlatformError;
use tracing::{debug, info};

use crate::bus::MessageBus;
use crate::lock;
use crate::manager::DialogOptions;
use crate::platform::{
    ChildWindow, EventHandler, HostProbe, MessageHandler, ParentChannel, WindowOpener,
};

/// Platform code reported when messaging a window that is already closed.
pub const WINDOW_CLOSED: i32 = -1;

/// One call to [`WindowOpener::open_window`], successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub url: String,
    pub options: DialogOptions,
}

#[derive(Default)]
struct PlatformState {
    opened: Vec<OpenRequest>,
    fail_next: Option<PlatformError>,
    current: Option<Arc<LoopbackWindow>>,
}

/// Window opener that creates [`LoopbackWindow`]s. Clones share state.
#[derive(Clone, Default)]
pub struct LoopbackPlatform {
    state: Arc<Mutex<PlatformState>>,
}

impl LoopbackPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next open call fail with `error`.
    pub fn fail_next_open(&self, error: PlatformError) {
        lock(&self.state).fail_next = Some(error);
    }

    pub fn open_requests(&self) -> Vec<OpenRequest> {
        lock(&self.state).opened.clone()
    }

    pub fn open_count(&self) -> usize {
        lock(&self.state).opened.len()
    }

    /// The most recently opened window.
    pub fn window(&self) -> Option<Arc<LoopbackWindow>> {
        lock(&self.state).current.clone()
    }
}

#[async_trait]
impl WindowOpener for LoopbackPlatform {
    async fn open_window(
        &self,
        url: &str,
        options: &DialogOptions,
    ) -> Result<Arc<dyn ChildWindow>, PlatformError> {
        // Opening completes on a later turn of the event loop.
        tokio::task::yield_now().await;

        let mut state = lock(&self.state);
        state.opened.push(OpenRequest {
            url: url.to_string(),
            options: *options,
        });
        if let Some(error) = state.fail_next.take() {
            debug!(url, code = error.code, "loopback open failing on request");
            return Err(error);
        }

        let window = Arc::new(LoopbackWindow::new(url));
        state.current = Some(window.clone());
        info!(url, "loopback window opened");
        Ok(window)
    }
}

/// Both ends of one loopback child window.
pub struct LoopbackWindow {
    url: String,
    to_child: Mutex<VecDeque<String>>,
    to_parent: Mutex<VecDeque<String>>,
    message_handler: Mutex<Option<Arc<dyn Fn(String) + Send + Sync>>>,
    event_handler: Mutex<Option<Arc<dyn Fn(i32) + Send + Sync>>>,
    closed: AtomicBool,
}

impl LoopbackWindow {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            to_child: Mutex::new(VecDeque::new()),
            to_parent: Mutex::new(VecDeque::new()),
            message_handler: Mutex::new(None),
            event_handler: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// The URL the window was opened with.
    pub fn launch_url(&self) -> &str {
        &self.url
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Host probe handed to code running "inside" this window.
    pub fn host(self: &Arc<Self>) -> LoopbackHost {
        LoopbackHost {
            window: Arc::downgrade(self),
        }
    }

    pub fn pending_to_child(&self) -> usize {
        lock(&self.to_child).len()
    }

    pub fn pending_to_parent(&self) -> usize {
        lock(&self.to_parent).len()
    }

    /// Deliver queued messages in both directions until no more are
    /// produced. Returns how many were delivered.
    pub fn pump(&self, child_bus: &MessageBus) -> usize {
        let mut total = 0;
        loop {
            let mut moved = 0;
            while let Some(raw) = pop(&self.to_child) {
                child_bus.receive_raw(&raw);
                moved += 1;
            }
            while let Some(raw) = pop(&self.to_parent) {
                let handler = lock(&self.message_handler).clone();
                match handler {
                    Some(handler) => handler(raw),
                    None => debug!("loopback message to parent with no handler dropped"),
                }
                moved += 1;
            }
            if moved == 0 {
                return total;
            }
            total += moved;
        }
    }

    /// Report a lifecycle status code to the parent, as the host does when
    /// the window goes away. The window is closed afterwards.
    pub fn emit_event(&self, code: i32) {
        self.closed.store(true, Ordering::SeqCst);
        let handler = lock(&self.event_handler).clone();
        match handler {
            Some(handler) => handler(code),
            None => debug!(code, "loopback lifecycle event with no handler dropped"),
        }
    }

    fn post_to_parent(&self, raw: &str) -> Result<(), PlatformError> {
        if self.is_closed() {
            return Err(PlatformError::new(WINDOW_CLOSED, "window is closed"));
        }
        lock(&self.to_parent).push_back(raw.to_string());
        Ok(())
    }
}

impl ChildWindow for LoopbackWindow {
    fn message_child(&self, raw: &str) -> Result<(), PlatformError> {
        if self.is_closed() {
            return Err(PlatformError::new(WINDOW_CLOSED, "window is closed"));
        }
        lock(&self.to_child).push_back(raw.to_string());
        Ok(())
    }

    fn on_message(&self, handler: MessageHandler) {
        *lock(&self.message_handler) = Some(Arc::from(handler));
    }

    fn on_event(&self, handler: EventHandler) {
        *lock(&self.event_handler) = Some(Arc::from(handler));
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!(url = %self.url, "loopback window closed");
        }
    }
}

fn pop(queue: &Mutex<VecDeque<String>>) -> Option<String> {
    lock(queue).pop_front()
}

/// The child's view of its host: a probe that finds parent messaging and
/// the channel itself.
#[derive(Clone)]
pub struct LoopbackHost {
    window: Weak<LoopbackWindow>,
}

impl HostProbe for LoopbackHost {
    fn parent_channel(&self) -> Option<Arc<dyn ParentChannel>> {
        Some(Arc::new(self.clone()))
    }
}

impl ParentChannel for LoopbackHost {
    fn message_parent(&self, raw: &str) -> Result<(), PlatformError> {
        match self.window.upgrade() {
            Some(window) => window.post_to_parent(raw),
            None => Err(PlatformError::new(WINDOW_CLOSED, "window no longer exists")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Role;
    use crate::envelope::{Envelope, MessageKind};
    use serde_json::json;

    fn collect(bus: &MessageBus, kind: MessageKind) -> Arc<Mutex<Vec<Envelope>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.listen(kind, move |env| sink.lock().unwrap().push(env.clone()));
        seen
    }

    #[tokio::test]
    async fn opener_records_requests_and_exposes_window() {
        let platform = LoopbackPlatform::new();
        let options = DialogOptions::default();
        let handle = platform.open_window("https://h/d.html?view=x", &options).await;
        assert!(handle.is_ok());
        assert_eq!(platform.open_count(), 1);
        assert_eq!(platform.open_requests()[0].url, "https://h/d.html?view=x");
        assert_eq!(platform.window().unwrap().launch_url(), "https://h/d.html?view=x");
    }

    #[tokio::test]
    async fn fail_next_open_is_one_shot() {
        let platform = LoopbackPlatform::new();
        platform.fail_next_open(PlatformError::new(12002, "page not found"));
        let options = DialogOptions::default();

        let err = platform.open_window("u", &options).await.err().unwrap();
        assert_eq!(err.code, 12002);
        assert!(platform.window().is_none());
        assert!(platform.open_window("u", &options).await.is_ok());
        assert_eq!(platform.open_count(), 2);
    }

    #[test]
    fn pump_delivers_both_directions_in_order() {
        let window = Arc::new(LoopbackWindow::new("u"));
        let child_bus = MessageBus::detect(&window.host());
        assert_eq!(child_bus.role(), Role::Child);
        let updates = collect(&child_bus, MessageKind::Update);

        let to_parent = Arc::new(Mutex::new(Vec::new()));
        let sink = to_parent.clone();
        window.on_message(Box::new(move |raw| sink.lock().unwrap().push(raw)));

        window.message_child(&Envelope::Update(json!(1)).to_json()).unwrap();
        window.message_child(&Envelope::Update(json!(2)).to_json()).unwrap();
        child_bus.publish_to_parent(&Envelope::Ready).unwrap();
        assert_eq!(window.pending_to_child(), 2);
        assert_eq!(window.pending_to_parent(), 1);

        assert_eq!(window.pump(&child_bus), 3);
        assert_eq!(
            *updates.lock().unwrap(),
            vec![Envelope::Update(json!(1)), Envelope::Update(json!(2))]
        );
        assert_eq!(*to_parent.lock().unwrap(), vec![r#"{"kind":"ready"}"#.to_string()]);
        assert_eq!(window.pump(&child_bus), 0);
    }

    #[test]
    fn closed_window_refuses_messages() {
        let window = Arc::new(LoopbackWindow::new("u"));
        let host = window.host();
        window.close();
        assert!(window.is_closed());
        assert_eq!(window.message_child("{}").unwrap_err().code, WINDOW_CLOSED);
        assert_eq!(host.message_parent("{}").unwrap_err().code, WINDOW_CLOSED);
    }

    #[test]
    fn host_of_dropped_window_errors() {
        let window = Arc::new(LoopbackWindow::new("u"));
        let host = window.host();
        drop(window);
        assert!(host.message_parent("{}").is_err());
    }

    #[test]
    fn emit_event_reaches_handler_and_closes() {
        let window = LoopbackWindow::new("u");
        let codes = Arc::new(Mutex::new(Vec::new()));
        let sink = codes.clone();
        window.on_event(Box::new(move |code| sink.lock().unwrap().push(code)));

        window.emit_event(12006);
        assert_eq!(*codes.lock().unwrap(), vec![12006]);
        assert!(window.is_closed());
    }
}
