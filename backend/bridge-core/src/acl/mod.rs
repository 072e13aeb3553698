//! Capability-based permission checks.
//!
//! The permission manager is configured wholesale from loaded capability/
//! permission records and answers one question per dispatch: may this
//! command, invoked from this view with these extracted scope values, run?
//!
//! # Evaluation
//!
//! 1. Classify the command by namespace: names containing
//!    [`crate::PLUGIN_SEPARATOR`] were registered through the plugin host
//!    and are plugin-namespaced; bare names are first-party.
//! 2. Any capability that covers the requesting view and grants a
//!    permission matching the command name - with every extracted scope
//!    value satisfying that permission's scope patterns (or the permission
//!    declaring none) - allows.
//! 3. Otherwise the namespace's default policy applies: allow for
//!    first-party commands, deny for plugin-namespaced ones.
//!
//! A single matching grant is sufficient to allow; there is no
//! deny-overrides precedence. Evaluation order across capabilities cannot
//! change the outcome.

pub mod pattern;
pub mod scope;

pub use pattern::ScopePattern;
pub use scope::extract_scopes;

use crate::PLUGIN_SEPARATOR;
use crate::error::acl::AclError;

use models::acl::{AclConfig, Capability, Policy};

use std::collections::HashMap;
use std::sync::RwLock;

use log::{debug, info, warn};

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { reason: String },
}

impl Decision {
    fn deny(reason: impl Into<String>) -> Self {
        Decision::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// A permission with its command and scope patterns compiled.
struct CompiledPermission {
    command: ScopePattern,
    scopes: Vec<ScopePattern>,
}

struct AclState {
    capabilities: Vec<Capability>,
    permissions: HashMap<String, CompiledPermission>,
    default_app_policy: Policy,
    default_plugin_policy: Policy,
}

impl Default for AclState {
    fn default() -> Self {
        Self {
            capabilities: Vec::new(),
            permissions: HashMap::new(),
            default_app_policy: Policy::Allow,
            default_plugin_policy: Policy::Deny,
        }
    }
}

/// Evaluates whether a named command, invoked from a given view with a
/// given set of extracted scope values, is authorized.
#[derive(Default)]
pub struct PermissionManager {
    state: RwLock<AclState>,
}

impl PermissionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or reload) the ACL configuration, replacing prior state
    /// wholesale.
    ///
    /// Capabilities referencing unknown permission names are kept but warn;
    /// the dangling reference simply never matches.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Pattern`] when a command or scope pattern fails
    /// to compile.
    pub fn configure(&self, config: AclConfig) -> Result<(), AclError> {
        let mut permissions = HashMap::new();
        for permission in &config.permissions {
            let command = ScopePattern::compile(&permission.command)?;
            let mut scopes = Vec::with_capacity(permission.scopes.len());
            for scope in &permission.scopes {
                scopes.push(ScopePattern::compile(scope)?);
            }
            permissions.insert(permission.name.clone(), CompiledPermission { command, scopes });
        }

        for capability in &config.capabilities {
            for name in &capability.permissions {
                if !permissions.contains_key(name) {
                    warn!(
                        "Capability '{}' references unknown permission '{name}'",
                        capability.name
                    );
                }
            }
        }

        info!(
            "Configured ACL: {} capabilities, {} permissions",
            config.capabilities.len(),
            config.permissions.len()
        );

        let mut state = self.state.write().expect("acl state poisoned");
        *state = AclState {
            capabilities: config.capabilities,
            permissions,
            default_app_policy: config.default_app_policy,
            default_plugin_policy: config.default_plugin_policy,
        };
        Ok(())
    }

    /// Check one invocation. See the module docs for the algorithm.
    pub fn check(&self, command: &str, webview_label: &str, scopes: &[String]) -> Decision {
        let state = self.state.read().expect("acl state poisoned");

        for capability in &state.capabilities {
            if !capability.targets.iter().any(|t| t.covers(webview_label)) {
                continue;
            }

            for permission_name in &capability.permissions {
                let Some(permission) = state.permissions.get(permission_name) else {
                    continue;
                };
                if !permission.command.matches(command) {
                    continue;
                }
                if scopes_satisfied(permission, scopes) {
                    debug!(
                        "Allowed '{command}' from '{webview_label}' via capability '{}'",
                        capability.name
                    );
                    return Decision::Allow;
                }
            }
        }

        let default = if is_plugin_command(command) {
            state.default_plugin_policy
        } else {
            state.default_app_policy
        };

        match default {
            Policy::Allow => Decision::Allow,
            Policy::Deny => Decision::deny(format!(
                "Command '{command}' is not allowed for webview '{webview_label}'"
            )),
        }
    }
}

/// Every extracted scope value must satisfy at least one of the
/// permission's scope patterns. A permission with no scope restriction
/// accepts any values.
fn scopes_satisfied(permission: &CompiledPermission, scopes: &[String]) -> bool {
    if permission.scopes.is_empty() {
        return true;
    }
    scopes
        .iter()
        .all(|value| permission.scopes.iter().any(|p| p.matches(value)))
}

/// Whether a command name is plugin-namespaced.
pub fn is_plugin_command(command: &str) -> bool {
    command.contains(PLUGIN_SEPARATOR)
}
