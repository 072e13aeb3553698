//! Capability/permission configuration surface.
//!
//! These records are loaded from application configuration and handed to
//! the permission manager wholesale. A [`Capability`] binds one or more
//! target views to a set of named permissions; a [`Permission`] names a
//! command (or command glob) plus optional scope patterns constraining
//! which argument values the command may receive.

pub mod builder;

pub use builder::CapabilityBuilder;

use serde::{Deserialize, Serialize};

/// Default decision applied when no capability matches a command.
///
/// First-party commands default to [`Policy::Allow`]; plugin-namespaced
/// commands default to [`Policy::Deny`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    Allow,
    Deny,
}

/// Which views a capability grants access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityTarget {
    /// Every registered view.
    All,
    /// A single view, matched by exact label.
    Label(String),
}

impl CapabilityTarget {
    /// Whether this target covers the view with the given label.
    pub fn covers(&self, label: &str) -> bool {
        match self {
            CapabilityTarget::All => true,
            CapabilityTarget::Label(target) => target == label,
        }
    }
}

/// An authorization rule for a command, optionally scope-restricted.
///
/// `command` may be an exact name or a glob pattern (`fs.*`). An empty
/// `scopes` list means the permission carries no scope restriction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    /// Unique permission name, referenced from capabilities.
    pub name: String,
    /// Command name or glob pattern this permission covers.
    pub command: String,
    /// Allowed scope patterns (path globs, URL patterns). Empty = unrestricted.
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// A named grant binding target views to a set of permission names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capability {
    /// Unique capability name (for diagnostics).
    pub name: String,
    /// Views this capability applies to.
    pub targets: Vec<CapabilityTarget>,
    /// Names of [`Permission`] records this capability grants.
    pub permissions: Vec<String>,
}

impl Capability {
    pub fn builder(name: impl Into<String>) -> CapabilityBuilder {
        CapabilityBuilder::new(name)
    }
}

/// Complete ACL configuration, replaced wholesale on reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AclConfig {
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default = "default_app_policy")]
    pub default_app_policy: Policy,
    #[serde(default = "default_plugin_policy")]
    pub default_plugin_policy: Policy,
}

fn default_app_policy() -> Policy {
    Policy::Allow
}

fn default_plugin_policy() -> Policy {
    Policy::Deny
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            capabilities: Vec::new(),
            permissions: Vec::new(),
            default_app_policy: default_app_policy(),
            default_plugin_policy: default_plugin_policy(),
        }
    }
}
