//! Command registry and dispatch.
//!
//! Maps command names to async handlers, decodes arguments, consults the
//! permission manager before invocation, and coerces every failure mode
//! into an [`InvokeResult`]. The `invoke` boundary is total: it never
//! propagates an error or a panic to its caller.
//!
//! # Locking
//!
//! The name→handler map is behind its own short-lived lock; the lock is
//! released before the handler future is polled.

pub mod context;
pub mod result;

pub use context::InvokeContext;
pub use result::{InvokeResult, codes};

use crate::acl::{Decision, PermissionManager, extract_scopes};
use crate::error::command::CommandError;

use common::ErrorLocation;

use std::collections::HashMap;
use std::future::Future;
use std::panic::Location;
use std::sync::{Arc, RwLock};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use log::{debug, warn};

/// Future returned by a command handler.
pub type CommandFuture = BoxFuture<'static, InvokeResult>;

/// A registered backend operation.
///
/// Implemented for any `Fn(InvokeContext) -> CommandFuture`; most callers
/// go through [`CommandRegistry::register_fn`] instead of implementing this
/// by hand.
pub trait CommandHandler: Send + Sync {
    fn call(&self, ctx: InvokeContext) -> CommandFuture;
}

impl<F> CommandHandler for F
where
    F: Fn(InvokeContext) -> CommandFuture + Send + Sync,
{
    fn call(&self, ctx: InvokeContext) -> CommandFuture {
        self(ctx)
    }
}

/// Name→handler registry.
///
/// `Clone` hands out another handle to the same map.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: Arc<RwLock<HashMap<String, Arc<dyn CommandHandler>>>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a unique name.
    ///
    /// Registering an already-used name deterministically **replaces** the
    /// prior handler and logs a warning.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::EmptyName`] for an empty name.
    pub fn register(
        &self,
        name: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), CommandError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CommandError::EmptyName {
                message: String::from("Command name cannot be empty"),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut handlers = self.handlers.write().expect("command registry poisoned");
        if handlers.insert(name.clone(), handler).is_some() {
            warn!("Replacing existing command handler for '{name}'");
        } else {
            debug!("Registered command '{name}'");
        }
        Ok(())
    }

    /// Register an async closure as a handler.
    pub fn register_fn<F, Fut>(&self, name: impl Into<String>, f: F) -> Result<(), CommandError>
    where
        F: Fn(InvokeContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = InvokeResult> + Send + 'static,
    {
        self.register(name, Arc::new(move |ctx: InvokeContext| f(ctx).boxed()))
    }

    /// Whether a handler is registered under the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers
            .read()
            .expect("command registry poisoned")
            .contains_key(name)
    }

    /// All registered command names.
    pub fn names(&self) -> Vec<String> {
        self.handlers
            .read()
            .expect("command registry poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Dispatch one invocation.
    ///
    /// Order: handler lookup → body parse → scope extraction + permission
    /// check (a denial short-circuits; the handler never runs and performs
    /// no side effects) → handler invocation with panic containment.
    ///
    /// Always returns an [`InvokeResult`]; never propagates a failure.
    pub async fn invoke(
        &self,
        ctx: InvokeContext,
        permissions: Option<&PermissionManager>,
    ) -> InvokeResult {
        let handler = {
            let handlers = self.handlers.read().expect("command registry poisoned");
            handlers.get(&ctx.command).cloned()
        };

        let Some(handler) = handler else {
            debug!("Unknown command '{}'", ctx.command);
            return InvokeResult::error(
                codes::UNKNOWN_COMMAND,
                format!("No command registered under '{}'", ctx.command),
            );
        };

        // Malformed bodies fail here, before the permission check and
        // before the handler body.
        let body = match ctx.body_value() {
            Ok(body) => body,
            Err(e) => {
                debug!("Body decode failed for '{}': {e}", ctx.command);
                return InvokeResult::error(codes::DECODE_ERROR, e.to_string());
            }
        };

        if let Some(permissions) = permissions {
            let scopes = extract_scopes(&body);
            match permissions.check(&ctx.command, &ctx.webview_label, &scopes) {
                Decision::Allow => {}
                Decision::Deny { reason } => {
                    warn!(
                        "Denied command '{}' from webview '{}': {reason}",
                        ctx.command, ctx.webview_label
                    );
                    return InvokeResult::error(codes::PERMISSION_DENIED, reason);
                }
            }
        }

        let command = ctx.command.clone();

        // Contain handler panics: the dispatch boundary is total.
        match std::panic::AssertUnwindSafe(handler.call(ctx))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic);
                warn!("Handler for '{command}' panicked: {message}");
                InvokeResult::error(codes::INTERNAL, format!("Handler panicked: {message}"))
            }
        }
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}
