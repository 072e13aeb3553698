//! Wire-level data structures for the shellbridge workspace.
//!
//! This crate contains pure data that crosses the bridge: invoke bodies,
//! event envelopes, channel wire shapes, and the capability/permission
//! configuration surface. Models have no business logic - they're just
//! data that can be passed between layers.
//!
//! ## Architecture
//!
//! - **common**: shared utilities (error location, status codes)
//! - **models** (this crate): pure data structures
//! - **bridge-core**: the bridge engine operating on models

pub mod acl;
pub mod channel;
pub mod error;
pub mod event;
pub mod invoke;

pub use acl::{AclConfig, Capability, CapabilityBuilder, CapabilityTarget, Permission, Policy};
pub use channel::{CHANNEL_ID_KEY, ChannelMessage, channel_ref};
pub use error::model_error::ModelError;
pub use event::{EventEnvelope, FrontendEvent};
pub use invoke::{DEFERRED_KEY, ErrorBody, ResultBody, deferred_marker};
