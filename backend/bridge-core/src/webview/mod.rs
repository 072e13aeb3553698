//! Webview handles and the script-injection primitive.
//!
//! The rendering surface is single-threaded and holds an internal lock on a
//! view for the duration of request handling, so evaluating a script
//! synchronously from the task that is dispatching a request for that same
//! view deadlocks. Every delivery (channel sends, event emissions, responder
//! resolutions) therefore goes through a per-view queue: [`Webview::eval`]
//! enqueues the script and the view's own controlling task drains
//! [`ScriptReceiver`] and runs the raw evaluation primitive.
//!
//! # Thread Safety
//!
//! [`Webview`] and [`WebviewRegistry`] are `Clone` and shareable across
//! tasks; all clones point at the same queue/map.

use crate::JS_NAMESPACE;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::{debug, info, warn};
use tokio::sync::mpsc;

/// Handle to one embedded rendering surface instance.
///
/// Identified by label; owns the sending half of the view's script queue.
#[derive(Clone)]
pub struct Webview {
    label: Arc<str>,
    script_tx: mpsc::UnboundedSender<String>,
}

/// Receiving half of a view's script queue.
///
/// In production the view's controlling task drains this and calls the raw
/// "evaluate script in view" primitive. Tests drain it directly to observe
/// deliveries.
pub struct ScriptReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl ScriptReceiver {
    /// Receive the next queued script, or `None` once the view's senders
    /// are all gone.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Drain everything currently queued without waiting.
    pub fn drain(&mut self) -> Vec<String> {
        let mut scripts = Vec::new();
        while let Ok(script) = self.rx.try_recv() {
            scripts.push(script);
        }
        scripts
    }
}

impl Webview {
    /// Create a webview handle and the receiver its controlling task drains.
    pub fn new(label: impl Into<String>) -> (Self, ScriptReceiver) {
        let (script_tx, rx) = mpsc::unbounded_channel();
        let webview = Self {
            label: Arc::from(label.into()),
            script_tx,
        };
        (webview, ScriptReceiver { rx })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Queue a script for evaluation on the view's controlling task.
    ///
    /// Never evaluates inline. Returns `false` if the view has been torn
    /// down (receiver dropped); delivery failures are swallowed here by
    /// design - there is no delivery-acknowledgment path.
    pub fn eval(&self, script: impl Into<String>) -> bool {
        let script = script.into();
        match self.script_tx.send(script) {
            Ok(()) => true,
            Err(_) => {
                debug!("Dropped script for torn-down webview '{}'", self.label);
                false
            }
        }
    }
}

impl std::fmt::Debug for Webview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Webview").field("label", &self.label).finish()
    }
}

/// Registry of live webviews, keyed by label.
#[derive(Clone, Default)]
pub struct WebviewRegistry {
    views: Arc<RwLock<HashMap<String, Webview>>>,
}

impl WebviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view under its label, replacing any prior registration.
    pub fn register(&self, webview: Webview) {
        let label = webview.label().to_string();
        let mut views = self.views.write().expect("webview registry poisoned");
        if views.insert(label.clone(), webview).is_some() {
            warn!("Replacing existing webview registration for '{label}'");
        } else {
            info!("Registered webview '{label}'");
        }
    }

    pub fn get(&self, label: &str) -> Option<Webview> {
        self.views
            .read()
            .expect("webview registry poisoned")
            .get(label)
            .cloned()
    }

    /// All currently registered labels.
    pub fn labels(&self) -> Vec<String> {
        self.views
            .read()
            .expect("webview registry poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Remove a view on teardown. Channel cleanup is coordinated by the
    /// bridge, which closes the view's channels before calling this.
    pub fn remove(&self, label: &str) -> Option<Webview> {
        let removed = self
            .views
            .write()
            .expect("webview registry poisoned")
            .remove(label);
        if removed.is_some() {
            info!("Removed webview '{label}'");
        }
        removed
    }
}

/// Format the channel-message delivery call:
/// `(channelToken, sequenceNumber, serializedPayload)`.
pub fn channel_message_script(token: &str, seq: u64, payload_json: &str) -> String {
    format!("{JS_NAMESPACE}.channelMessage('{token}', {seq}, {payload_json})")
}

/// Format the zero-argument channel close call naming the token.
pub fn channel_close_script(token: &str) -> String {
    format!("{JS_NAMESPACE}.channelClose('{token}')")
}

/// Format the event delivery call:
/// `(eventName, serializedPayload, eventId, timestampMillis)`.
pub fn event_script(name: &str, payload_json: &str, id: &str, timestamp_millis: u64) -> String {
    format!("{JS_NAMESPACE}.event('{name}', {payload_json}, '{id}', {timestamp_millis})")
}
