//! Deferred response correlation.
//!
//! A handler that cannot answer immediately returns the well-known pending
//! marker `{"__deferred__": "<token>"}` as its result and keeps the
//! [`Responder`]. The frontend suspends its promise keyed by the token
//! until the correlated event arrives on the reserved response event name.
//! Resolution happens at most once: the first `resolve`/`reject` call wins
//! and later calls are logged no-ops (documented choice).

use crate::DEFERRED_RESPONSE_EVENT;
use crate::command::result::InvokeResult;
use crate::event::{EventBus, EventTarget};

use models::invoke::deferred_marker;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use serde_json::{Value, json};
use uuid::Uuid;

/// Hands out pending tokens and their responders. One per bridge, managed
/// in the state container.
#[derive(Clone)]
pub struct DeferredBridge {
    events: EventBus,
}

impl DeferredBridge {
    pub fn new(events: EventBus) -> Self {
        Self { events }
    }

    /// Create a pending result for the given originating view.
    ///
    /// Returns the marker the handler hands back immediately, plus the
    /// responder that completes the invocation later from any context.
    pub fn defer(&self, webview_label: &str) -> (InvokeResult, Responder) {
        let token = Uuid::new_v4().to_string();
        debug!("Deferred response {token} for webview '{webview_label}'");

        let responder = Responder {
            token: token.clone(),
            webview_label: webview_label.to_string(),
            events: self.events.clone(),
            used: Arc::new(AtomicBool::new(false)),
        };

        (InvokeResult::Json(deferred_marker(&token)), responder)
    }
}

/// Completes one deferred invocation, exactly once.
///
/// `Clone` shares the once-guard, so a cloned responder cannot double-fire
/// either. If the destination view has been torn down the emission is a
/// silent no-op, never a crash.
#[derive(Clone)]
pub struct Responder {
    token: String,
    webview_label: String,
    events: EventBus,
    used: Arc<AtomicBool>,
}

impl Responder {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Resolve the pending invocation with a success value.
    pub fn resolve(&self, value: Value) {
        self.finish(json!({
            "token": self.token,
            "ok": true,
            "value": value,
        }));
    }

    /// Reject the pending invocation with a structured error.
    pub fn reject(&self, code: impl Into<String>, message: impl Into<String>) {
        self.finish(json!({
            "token": self.token,
            "ok": false,
            "error": { "error": code.into(), "message": message.into() },
        }));
    }

    fn finish(&self, payload: Value) {
        if self.used.swap(true, Ordering::SeqCst) {
            warn!(
                "Ignoring repeated resolution of deferred response {}",
                self.token
            );
            return;
        }

        self.events.emit(
            DEFERRED_RESPONSE_EVENT,
            &payload,
            &EventTarget::webview(&self.webview_label),
        );
    }
}
