//! `paneline demo`: one complete dialog cycle over the loopback platform.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use paneline_common::PanelineError;
use paneline_config::schema::PanelineConfig;
use paneline_dialog::events::USER_CLOSED;
use paneline_dialog::loopback::LoopbackPlatform;
use paneline_dialog::platform::NoHost;
use paneline_dialog::{
    ChildSession, ChildViewState, DialogManager, DialogSession, LaunchEncoding, LaunchParams,
    MessageBus, UpdateOutcome,
};
use serde_json::{json, Value};
use tracing::info;

/// What happened during a demo run.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoSummary {
    pub url: String,
    pub encoding: LaunchEncoding,
    pub updates_sent: u32,
    pub updates_deferred: u32,
    pub final_revision: u64,
    pub final_payload: Value,
    pub closed: bool,
}

impl fmt::Display for DemoSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "launch url:   {} bytes", self.url.len())?;
        writeln!(f, "encoding:     {}", self.encoding)?;
        writeln!(
            f,
            "updates:      {} sent, {} deferred",
            self.updates_sent, self.updates_deferred
        )?;
        writeln!(f, "revision:     {}", self.final_revision)?;
        write!(f, "closed:       {}", self.closed)
    }
}

fn demo_payload(view: &str, revision: u32, bytes: usize) -> Value {
    json!({
        "view": view,
        "revision": revision,
        "body": "x".repeat(bytes),
    })
}

pub async fn run(
    config: &PanelineConfig,
    view: &str,
    payload_bytes: usize,
    updates: u32,
) -> Result<DemoSummary, PanelineError> {
    let store = super::open_store(config)?;

    // Parent side.
    let parent_bus = Arc::new(MessageBus::detect(&NoHost));
    let platform = LoopbackPlatform::new();
    let manager = DialogManager::new(parent_bus, Arc::new(platform.clone()));
    let session = DialogSession::new(manager, store.clone(), config)?;

    let target = session
        .open(view, demo_payload(view, 0, payload_bytes))
        .await?;
    info!(url_bytes = target.url.len(), encoding = %target.encoding, "dialog opened");

    // Child side, running inside the loopback window.
    let window = platform
        .window()
        .ok_or_else(|| PanelineError::Other("loopback window missing after open".into()))?;
    let child_bus = Arc::new(MessageBus::detect(&window.host()));
    let params = LaunchParams::from_url(window.launch_url());
    let child = ChildSession::boot(child_bus.clone(), &params, store.as_ref())?;

    window.pump(&child_bus);
    let timeout = Duration::from_millis(u64::from(config.handshake.ready_timeout_ms));
    child.wait_for_payload(timeout).await?;

    let mut updates_sent = 0;
    let mut updates_deferred = 0;
    for revision in 1..=updates {
        match session.update(demo_payload(view, revision, payload_bytes))? {
            UpdateOutcome::Sent | UpdateOutcome::Queued => updates_sent += 1,
            UpdateOutcome::Deferred => updates_deferred += 1,
        }
        window.pump(&child_bus);
    }

    let (final_payload, final_revision) = match child.state() {
        ChildViewState::Loaded { payload, revision } => (payload, revision),
        other => {
            return Err(PanelineError::Dialog(format!(
                "child view not loaded after handshake: {other:?}"
            )))
        }
    };

    window.emit_event(USER_CLOSED);
    let closed = !session.is_open() && !session.manager().is_open();
    info!(final_revision, closed, "demo cycle complete");

    Ok(DemoSummary {
        url: target.url,
        encoding: target.encoding,
        updates_sent,
        updates_deferred,
        final_revision,
        final_payload,
        closed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn small_payload_demo_inlines_and_closes() {
        let config = PanelineConfig::default();
        let summary = run(&config, "demo", 64, 3).await.unwrap();

        assert_eq!(summary.encoding, LaunchEncoding::Inline);
        assert_eq!(summary.updates_sent, 3);
        assert_eq!(summary.updates_deferred, 0);
        // Launch payload, initialize, then three updates.
        assert_eq!(summary.final_revision, 4);
        assert_eq!(summary.final_payload["revision"], 3);
        assert!(summary.closed);
    }

    #[tokio::test]
    async fn large_payload_demo_uses_a_session() {
        let config = PanelineConfig::default();
        let summary = run(&config, "diff", 5000, 0).await.unwrap();

        assert!(matches!(summary.encoding, LaunchEncoding::Session(_)));
        assert!(summary.url.contains("sessionId="));
        assert_eq!(summary.final_revision, 1);
        assert!(summary.closed);
    }

    #[tokio::test]
    async fn file_store_demo_leaves_nothing_staged() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PanelineConfig::default();
        config.store.backend = paneline_config::schema::StoreBackend::File;
        config.store.directory = dir.path().display().to_string();

        let summary = run(&config, "diff", 5000, 1).await.unwrap();

        assert!(matches!(summary.encoding, LaunchEncoding::Session(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn summary_display_lists_encoding() {
        let summary = DemoSummary {
            url: "u".into(),
            encoding: LaunchEncoding::Inline,
            updates_sent: 1,
            updates_deferred: 0,
            final_revision: 2,
            final_payload: json!({}),
            closed: true,
        };
        let text = summary.to_string();
        assert!(text.contains("encoding:     inline"));
        assert!(text.contains("closed:       true"));
    }
}
