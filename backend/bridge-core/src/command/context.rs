//! Per-invocation request context.

use crate::channel::{Channel, ChannelRegistry};
use crate::command::result::InvokeResult;
use crate::deferred::{DeferredBridge, Responder};
use crate::error::channel::ChannelError;
use crate::error::command::CommandError;
use crate::event::EventBus;
use crate::state::StateContainer;
use crate::webview::Webview;

use common::ErrorLocation;

use std::collections::HashMap;
use std::panic::Location;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Immutable per-invocation record, constructed once per request and owned
/// exclusively by the single dispatch call.
///
/// Carries the command name, the raw serialized argument bytes, request
/// headers, the originating-view identifier, a handle to the state
/// container, and (when the view is still live) a handle back to the
/// originating view for script injection.
pub struct InvokeContext {
    pub command: String,
    pub body: Vec<u8>,
    pub headers: HashMap<String, String>,
    pub webview_label: String,
    pub state: StateContainer,
    pub webview: Option<Webview>,
}

impl InvokeContext {
    /// Decode the request body into typed arguments.
    ///
    /// An empty body decodes as `{}` so argument structs made entirely of
    /// optional fields work without a body.
    pub fn args<T: DeserializeOwned>(&self) -> Result<T, CommandError> {
        Ok(serde_json::from_value(self.body_value()?)?)
    }

    /// The request body as a JSON value (`{}` when the body is empty).
    pub fn body_value(&self) -> Result<Value, CommandError> {
        if self.body.is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Resolve a `{"__channelId": "<token>"}` marker from the request
    /// arguments into a live channel.
    ///
    /// Channel tokens are frontend-minted: first use of a token implicitly
    /// opens the channel, bound to the originating view. The channel
    /// registry lives in the state container, managed by the bridge at
    /// construction time.
    pub fn channel_from_args(&self, marker: &Value) -> Result<Channel, ChannelError> {
        let webview = self.webview.as_ref().ok_or_else(|| ChannelError::Missing {
            message: format!(
                "Originating view '{}' is gone - cannot resolve channel",
                self.webview_label
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let channels = self.state.require::<ChannelRegistry>();
        channels.resolve(marker, webview)
    }

    /// Open a fresh channel to the originating view.
    pub fn open_channel(&self) -> Result<Channel, ChannelError> {
        let webview = self.webview.clone().ok_or_else(|| ChannelError::Missing {
            message: format!(
                "Originating view '{}' is gone - cannot open channel",
                self.webview_label
            ),
            location: ErrorLocation::from(Location::caller()),
        })?;
        let channels = self.state.require::<ChannelRegistry>();
        Ok(channels.create(webview))
    }

    /// Defer this command's response: returns the pending-marker result the
    /// handler hands back immediately, plus the responder that completes it
    /// later via the event bus.
    pub fn defer_response(&self) -> (InvokeResult, Responder) {
        let deferred = self.state.require::<DeferredBridge>();
        deferred.defer(&self.webview_label)
    }

    /// The event bus, for handlers that emit.
    pub fn events(&self) -> EventBus {
        self.state.require::<EventBus>().as_ref().clone()
    }
}
