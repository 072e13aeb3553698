//! Bridge engine for embedded-webview application shells.
//!
//! This crate is the inter-process bridge between a native backend and an
//! untrusted script frontend running inside an embedded rendering surface.
//! It owns:
//!
//! - command registration and dispatch (with argument decoding)
//! - capability-based permission checks gating every dispatch
//! - ordered backend→frontend streaming channels
//! - a bidirectional named event bus
//! - deferred response correlation (pending token + later event)
//! - the type-keyed state container and the plugin host
//!
//! The rendering surface itself is an external collaborator. The engine
//! consumes exactly two primitives from it: "evaluate a script string in a
//! given view" (modeled by the per-view script queue in [`webview`]) and
//! "identify the view that issued a request" (the label carried on every
//! [`protocol::InvokeRequest`]).

pub mod acl;
pub mod bridge;
pub mod channel;
pub mod command;
pub mod deferred;
pub mod error;
pub mod event;
pub mod logger;
pub mod plugin;
pub mod protocol;
pub mod state;
pub mod webview;

#[cfg(test)]
mod tests;

/// Custom request scheme carrying commands: `shell://<command-name>`.
pub const BRIDGE_SCHEME: &str = "shell";

/// URI prefix stripped from incoming request URIs.
pub const SCHEME_PREFIX: &str = const_format::concatcp!(BRIDGE_SCHEME, "://");

/// Prefix shared by every reserved internal name.
pub const RESERVED_PREFIX: &str = "__bridge";

/// Reserved command bridging frontend-originated events to backend listeners.
pub const EVENT_COMMAND: &str = const_format::concatcp!(RESERVED_PREFIX, ".event");

/// Reserved event name carrying responder resolutions back to the frontend.
pub const DEFERRED_RESPONSE_EVENT: &str =
    const_format::concatcp!(RESERVED_PREFIX, ".deferred-response");

/// JS object the engine injects delivery calls against.
pub const JS_NAMESPACE: &str = "window.__SHELLBRIDGE__";

/// Separator between a plugin identifier and its command names.
///
/// Commands registered through the plugin host are namespaced
/// `<plugin>.<command>`; a name containing this separator is classified as
/// plugin-namespaced by the permission manager.
pub const PLUGIN_SEPARATOR: char = '.';
