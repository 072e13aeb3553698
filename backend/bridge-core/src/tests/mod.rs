// Unit tests for bridge-core, mirroring the source module layout.

mod acl;
mod channel;
mod logger;
mod state;
mod webview;

use crate::channel::ChannelRegistry;
use crate::command::InvokeContext;
use crate::deferred::DeferredBridge;
use crate::event::EventBus;
use crate::state::StateContainer;
use crate::webview::{ScriptReceiver, Webview, WebviewRegistry};

use std::collections::HashMap;

/// Build a state container wired the way the bridge builder wires it:
/// channel registry, event bus, and deferred bridge managed inside.
pub(crate) fn wired_state() -> (StateContainer, WebviewRegistry) {
    let state = StateContainer::new();
    let webviews = WebviewRegistry::new();
    let events = EventBus::new(webviews.clone());
    state.manage(ChannelRegistry::new());
    state.manage(events.clone());
    state.manage(DeferredBridge::new(events));
    (state, webviews)
}

/// Register a webview named `label` and return its handle + script queue.
pub(crate) fn register_webview(
    webviews: &WebviewRegistry,
    label: &str,
) -> (Webview, ScriptReceiver) {
    let (webview, receiver) = Webview::new(label);
    webviews.register(webview.clone());
    (webview, receiver)
}

/// Build an invocation context against the given state container.
pub(crate) fn context_for(
    command: &str,
    body: &str,
    state: &StateContainer,
    webview: Option<Webview>,
) -> InvokeContext {
    InvokeContext {
        command: command.to_string(),
        body: body.as_bytes().to_vec(),
        headers: HashMap::new(),
        webview_label: webview
            .as_ref()
            .map(|w| w.label().to_string())
            .unwrap_or_else(|| String::from("main")),
        state: state.clone(),
        webview,
    }
}
