use crate::acl::{Capability, CapabilityTarget};
use crate::error::model_error::ModelError;

use common::ErrorLocation;

use std::panic::Location;

/// Builder for creating validated Capability instances.
///
/// Provides a fluent API for constructing capabilities in code (tests,
/// plugin defaults) instead of deserializing them from configuration.
#[derive(Debug, Default)]
pub struct CapabilityBuilder {
    name: String,
    targets: Vec<CapabilityTarget>,
    permissions: Vec<String>,
}

impl CapabilityBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            targets: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// Grant to every registered view.
    pub fn for_all_targets(mut self) -> Self {
        self.targets.push(CapabilityTarget::All);
        self
    }

    /// Grant to the view with the given label.
    pub fn for_target(mut self, label: impl Into<String>) -> Self {
        self.targets.push(CapabilityTarget::Label(label.into()));
        self
    }

    /// Reference a permission by name.
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permissions.push(permission.into());
        self
    }

    /// Build the Capability with validation.
    #[track_caller]
    pub fn build(self) -> Result<Capability, ModelError> {
        if self.name.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Capability name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.targets.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Capability must have at least one target"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if self.permissions.is_empty() {
            return Err(ModelError::Validation {
                message: String::from("Capability must grant at least one permission"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Capability {
            name: self.name,
            targets: self.targets,
            permissions: self.permissions,
        })
    }
}
