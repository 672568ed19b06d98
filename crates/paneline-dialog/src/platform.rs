//! Seams to the host platform.
//!
//! The dialog core never creates windows or touches a real message channel
//! itself. Hosts implement these traits; [`crate::loopback`] provides an
//! in-process implementation.

use std::sync::Arc;

use async_trait::async_trait;
use paneline_common::PlatformError;

use crate::manager::DialogOptions;

/// Callback fed with every raw string the child posts to the parent.
pub type MessageHandler = Box<dyn Fn(String) + Send + Sync>;

/// Callback fed with lifecycle status codes (close / error).
pub type EventHandler = Box<dyn Fn(i32) + Send + Sync>;

/// Parent-side handle to a live child window.
pub trait ChildWindow: Send + Sync {
    /// Post a raw string into the child.
    fn message_child(&self, raw: &str) -> Result<(), PlatformError>;

    /// Install the inbound message callback, replacing any previous one.
    fn on_message(&self, handler: MessageHandler);

    /// Install the lifecycle event callback, replacing any previous one.
    fn on_event(&self, handler: EventHandler);

    /// Ask the platform to close the window. Does not report an event.
    fn close(&self);
}

/// The platform's asynchronous window-creation primitive.
#[async_trait]
pub trait WindowOpener: Send + Sync {
    async fn open_window(
        &self,
        url: &str,
        options: &DialogOptions,
    ) -> Result<Arc<dyn ChildWindow>, PlatformError>;
}

/// Child-side channel to the hosting parent.
pub trait ParentChannel: Send + Sync {
    fn message_parent(&self, raw: &str) -> Result<(), PlatformError>;
}

/// Startup probe for host-provided parent messaging.
///
/// A process that finds a parent channel is a child window; one that does
/// not is the parent panel.
pub trait HostProbe {
    fn parent_channel(&self) -> Option<Arc<dyn ParentChannel>>;
}

/// Probe for a process that is never hosted inside a dialog.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl HostProbe for NoHost {
    fn parent_channel(&self) -> Option<Arc<dyn ParentChannel>> {
        None
    }
}
