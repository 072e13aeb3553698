//! The long-lived application coordinator.
//!
//! One [`Bridge`] per running application instance owns every registry
//! (commands, channels, listeners, capabilities, webviews, state) and is
//! passed around by cheap clone. Registries are owned state behind their
//! own narrow locks, never ad hoc globals.
//!
//! Construction goes through [`BridgeBuilder`]: register app commands,
//! manage state, register plugins, configure the ACL, then `build()` -
//! which runs every plugin's setup phase and seals the plugin host.

use crate::EVENT_COMMAND;
use crate::acl::PermissionManager;
use crate::channel::ChannelRegistry;
use crate::command::{CommandRegistry, InvokeContext, InvokeResult, codes};
use crate::deferred::DeferredBridge;
use crate::error::BridgeError;
use crate::event::{EventBus, EventTarget, ListenerHandle};
use crate::plugin::{NavigationPolicy, NavigationRequest, Plugin, PluginHost, WebviewInfo};
use crate::protocol::{InvokeRequest, InvokeResponse, encode_result, parse_command};
use crate::state::StateContainer;
use crate::webview::{ScriptReceiver, Webview, WebviewRegistry};

use models::acl::AclConfig;
use models::event::{EventEnvelope, FrontendEvent};

use std::future::Future;
use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;
use url::Url;

struct BridgeInner {
    state: StateContainer,
    webviews: WebviewRegistry,
    channels: ChannelRegistry,
    events: EventBus,
    permissions: PermissionManager,
    commands: CommandRegistry,
    plugins: Arc<PluginHost>,
}

/// Coordinator handle. `Clone` shares the same registries.
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

impl Bridge {
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::default()
    }

    pub fn state(&self) -> &StateContainer {
        &self.inner.state
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.inner.commands
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.inner.channels
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn webviews(&self) -> &WebviewRegistry {
        &self.inner.webviews
    }

    pub fn permissions(&self) -> &PermissionManager {
        &self.inner.permissions
    }

    /// Register a view and hand back the script queue its controlling task
    /// drains.
    pub fn create_webview(&self, label: impl Into<String>) -> ScriptReceiver {
        let (webview, receiver) = Webview::new(label);
        self.inner.webviews.register(webview);
        receiver
    }

    /// Tear down a view: close its channels (notifying the destination),
    /// then drop the handle.
    pub fn destroy_webview(&self, label: &str) {
        self.inner.channels.close_for_webview(label);
        self.inner.webviews.remove(label);
    }

    /// A view finished loading: collect every plugin's init script and
    /// inject the concatenation once.
    pub fn webview_ready(&self, label: &str) {
        let info = WebviewInfo {
            label: label.to_string(),
        };
        if let Some(script) = self.inner.plugins.webview_ready_script(&info) {
            if let Some(webview) = self.inner.webviews.get(label) {
                debug!("Injecting plugin init script into '{label}'");
                webview.eval(script);
            }
        }
    }

    /// Ask plugins to filter a navigation. First non-allow wins.
    pub fn navigate(&self, webview_label: &str, url: Url) -> NavigationPolicy {
        self.inner.plugins.navigate(&NavigationRequest {
            webview_label: webview_label.to_string(),
            url,
        })
    }

    /// Emit an event to the given target.
    pub fn emit<T: Serialize>(&self, name: &str, payload: &T, target: &EventTarget) -> EventEnvelope {
        self.inner.events.emit(name, payload, target)
    }

    /// Register a backend listener.
    pub fn listen<F>(&self, name: impl Into<String>, callback: F) -> ListenerHandle
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        self.inner.events.listen(name, callback)
    }

    /// Serve one transport request.
    ///
    /// The reserved event command routes frontend-originated events to
    /// backend listeners; everything else dispatches through the command
    /// registry with the permission gate attached. The caller always gets
    /// a well-formed response, never a raw failure.
    pub async fn handle_request(&self, request: InvokeRequest) -> InvokeResponse {
        let command = match parse_command(&request.uri) {
            Ok(command) => command.to_string(),
            Err(e) => {
                return encode_result(InvokeResult::error(codes::DECODE_ERROR, e.to_string()));
            }
        };

        if command == EVENT_COMMAND {
            return self.ingest_frontend_event(&request);
        }

        let ctx = InvokeContext {
            command,
            body: request.body,
            headers: request.headers,
            webview_label: request.webview_label.clone(),
            state: self.inner.state.clone(),
            webview: self.inner.webviews.get(&request.webview_label),
        };

        let result = self
            .inner
            .commands
            .invoke(ctx, Some(&self.inner.permissions))
            .await;
        encode_result(result)
    }

    fn ingest_frontend_event(&self, request: &InvokeRequest) -> InvokeResponse {
        match serde_json::from_slice::<FrontendEvent>(&request.body) {
            Ok(event) => {
                self.inner.events.handle_frontend(event);
                encode_result(InvokeResult::Json(serde_json::Value::Null))
            }
            Err(e) => encode_result(InvokeResult::error(
                codes::DECODE_ERROR,
                format!("Malformed frontend event body: {e}"),
            )),
        }
    }

    /// Shut the bridge down: plugins in reverse registration order, then
    /// remaining channels and listeners.
    pub fn shutdown(&self) {
        info!("Bridge shutting down");
        self.inner.plugins.shutdown();
        for label in self.inner.webviews.labels() {
            self.inner.channels.close_for_webview(&label);
        }
        self.inner.events.remove_all_listeners(None);
    }
}

type StateSetup = Box<dyn FnOnce(&StateContainer) + Send>;
type CommandSetup = Box<dyn FnOnce(&CommandRegistry) -> Result<(), BridgeError> + Send>;

/// Staged configuration for a [`Bridge`].
#[derive(Default)]
pub struct BridgeBuilder {
    commands: Vec<CommandSetup>,
    state: Vec<StateSetup>,
    plugins: Vec<Arc<dyn Plugin>>,
    acl: Option<AclConfig>,
}

impl BridgeBuilder {
    /// Register an app command (first-party namespace).
    pub fn command<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(InvokeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InvokeResult> + Send + 'static,
    {
        let name = name.into();
        self.commands.push(Box::new(move |registry| {
            registry.register_fn(name, handler).map_err(BridgeError::from)
        }));
        self
    }

    /// Manage a state value before serving begins.
    pub fn manage<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.state.push(Box::new(move |state| state.manage(value)));
        self
    }

    /// Register a plugin; setup runs during `build()`.
    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Supply the capability/permission configuration.
    pub fn acl(mut self, config: AclConfig) -> Self {
        self.acl = Some(config);
        self
    }

    /// Wire the registries, run each plugin's setup phase, seal the plugin
    /// host, and configure the ACL.
    pub fn build(self) -> Result<Bridge, BridgeError> {
        let state = StateContainer::new();
        let webviews = WebviewRegistry::new();
        let events = EventBus::new(webviews.clone());
        let channels = ChannelRegistry::new();
        let permissions = PermissionManager::new();
        let commands = CommandRegistry::new();

        // Handlers reach these through the request context.
        state.manage(channels.clone());
        state.manage(events.clone());
        state.manage(DeferredBridge::new(events.clone()));

        for setup in self.state {
            setup(&state);
        }

        for setup in self.commands {
            setup(&commands)?;
        }

        let mut plugins = PluginHost::new();
        for plugin in self.plugins {
            plugins.register(plugin, &commands, &state)?;
        }
        plugins.seal();
        let plugins = Arc::new(plugins);

        // Plugins observe every event crossing the bus.
        let observer_host = Arc::clone(&plugins);
        events.set_observer(move |envelope| observer_host.broadcast_event(envelope));

        if let Some(config) = self.acl {
            permissions.configure(config)?;
        }

        info!(
            "Bridge built: {} command(s), {} plugin(s)",
            commands.names().len(),
            plugins.len()
        );

        Ok(Bridge {
            inner: Arc::new(BridgeInner {
                state,
                webviews,
                channels,
                events,
                permissions,
                commands,
                plugins,
            }),
        })
    }
}
