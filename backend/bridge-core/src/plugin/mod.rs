//! Plugin host and lifecycle hooks.
//!
//! Plugins register during a single setup phase driven by the bridge
//! builder; registration after setup has finished is a programming error
//! and panics. Each plugin contributes commands (auto-namespaced
//! `<plugin>.<command>`), may manage additional state, and receives four
//! lifecycle hooks: navigation filtering, webview-ready init scripts,
//! event notification, and shutdown.

use crate::PLUGIN_SEPARATOR;
use crate::command::{CommandRegistry, InvokeContext, InvokeResult};
use crate::error::command::CommandError;
use crate::error::plugin::PluginError;
use crate::state::StateContainer;

use models::event::EventEnvelope;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use url::Url;

/// Verdict on one navigation request. First non-allow from any plugin
/// wins, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationPolicy {
    Allow,
    Deny,
    Redirect(Url),
}

/// A navigation the rendering surface is about to perform.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub webview_label: String,
    pub url: Url,
}

/// Identity of a view that just finished loading.
#[derive(Debug, Clone)]
pub struct WebviewInfo {
    pub label: String,
}

/// Registration surface handed to [`Plugin::setup`].
///
/// Commands registered here land in the shared registry under the
/// plugin's namespace; state lands in the shared container.
pub struct PluginSetup<'a> {
    plugin_name: &'a str,
    commands: &'a CommandRegistry,
    state: &'a StateContainer,
}

impl PluginSetup<'_> {
    /// Register a command as `<plugin>.<name>`.
    pub fn register_command<F, Fut>(&self, name: &str, handler: F) -> Result<(), CommandError>
    where
        F: Fn(InvokeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InvokeResult> + Send + 'static,
    {
        let namespaced = format!("{}{PLUGIN_SEPARATOR}{name}", self.plugin_name);
        debug!("Plugin '{}' registers command '{namespaced}'", self.plugin_name);
        self.commands.register_fn(namespaced, handler)
    }

    /// Manage additional state in the shared container.
    pub fn manage<T: Send + Sync + 'static>(&self, value: T) {
        self.state.manage(value);
    }
}

/// An extension participating in the bridge lifecycle.
///
/// All hooks have allow/no-op defaults; a plugin overrides only what it
/// needs.
pub trait Plugin: Send + Sync {
    /// Unique plugin identifier; becomes the command namespace prefix.
    fn name(&self) -> &str;

    /// Contribute commands and state. Called exactly once during the
    /// bridge's setup phase.
    fn setup(&self, setup: &PluginSetup<'_>) -> Result<(), PluginError> {
        let _ = setup;
        Ok(())
    }

    /// Filter a navigation request.
    fn on_navigation(&self, request: &NavigationRequest) -> NavigationPolicy {
        let _ = request;
        NavigationPolicy::Allow
    }

    /// Contribute an init script injected once when a view becomes ready.
    fn on_webview_ready(&self, info: &WebviewInfo) -> Option<String> {
        let _ = info;
        None
    }

    /// Fire-and-forget notification of every event crossing the bus.
    fn on_event(&self, event: &EventEnvelope) {
        let _ = event;
    }

    /// Shutdown notification, invoked in reverse registration order.
    fn on_shutdown(&self) {}
}

/// Lifecycle coordinator for registered plugins.
#[derive(Default)]
pub struct PluginHost {
    plugins: Vec<Arc<dyn Plugin>>,
    sealed: AtomicBool,
}

impl PluginHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin and run its setup phase.
    ///
    /// # Panics
    ///
    /// Panics if called after [`PluginHost::seal`]; late registration is a
    /// programming error, not a runtime condition to recover from.
    pub fn register(
        &mut self,
        plugin: Arc<dyn Plugin>,
        commands: &CommandRegistry,
        state: &StateContainer,
    ) -> Result<(), PluginError> {
        assert!(
            !self.sealed.load(Ordering::SeqCst),
            "plugin registered after setup phase ended"
        );

        let setup = PluginSetup {
            plugin_name: plugin.name(),
            commands,
            state,
        };
        plugin.setup(&setup)?;
        info!("Registered plugin '{}'", plugin.name());
        self.plugins.push(plugin);
        Ok(())
    }

    /// End the setup phase. Further registration panics.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::SeqCst);
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Ask every plugin about a navigation, in registration order; the
    /// first non-allow verdict wins.
    pub fn navigate(&self, request: &NavigationRequest) -> NavigationPolicy {
        for plugin in &self.plugins {
            let policy = plugin.on_navigation(request);
            if policy != NavigationPolicy::Allow {
                warn!(
                    "Plugin '{}' returned {policy:?} for navigation to {}",
                    plugin.name(),
                    request.url
                );
                return policy;
            }
        }
        NavigationPolicy::Allow
    }

    /// Collect every plugin's init script for a freshly ready view,
    /// concatenated in registration order for a single injection.
    pub fn webview_ready_script(&self, info: &WebviewInfo) -> Option<String> {
        let scripts: Vec<String> = self
            .plugins
            .iter()
            .filter_map(|plugin| plugin.on_webview_ready(info))
            .collect();

        if scripts.is_empty() {
            None
        } else {
            Some(scripts.join(";\n"))
        }
    }

    /// Notify every plugin of an event crossing the bus.
    pub fn broadcast_event(&self, event: &EventEnvelope) {
        for plugin in &self.plugins {
            plugin.on_event(event);
        }
    }

    /// Shut plugins down in reverse registration order.
    pub fn shutdown(&self) {
        for plugin in self.plugins.iter().rev() {
            debug!("Shutting down plugin '{}'", plugin.name());
            plugin.on_shutdown();
        }
    }
}
