//! Test helpers for bridge integration tests.
//!
//! This module provides utilities for exercising the full invoke path:
//! - Building a bridge with a representative command/plugin mix
//! - Posting JSON requests and decoding responses
//! - A test plugin with a namespaced command

use bridge_core::bridge::Bridge;
use bridge_core::command::InvokeResult;
use bridge_core::error::plugin::PluginError;
use bridge_core::plugin::{Plugin, PluginSetup};
use bridge_core::protocol::{InvokeRequest, InvokeResponse};

use models::acl::{AclConfig, Capability, CapabilityTarget, Permission};

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Value, json};

/// Label used for the primary test view.
pub const MAIN_VIEW: &str = "main";

#[derive(Deserialize)]
struct PairArgs {
    a: i64,
    b: i64,
}

/// Test plugin exposing a single command under the `vault` namespace.
pub struct VaultPlugin;

impl Plugin for VaultPlugin {
    fn name(&self) -> &str {
        "vault"
    }

    fn setup(&self, setup: &PluginSetup<'_>) -> Result<(), PluginError> {
        setup.register_command("read", |_ctx| async move {
            InvokeResult::ok(json!({"secret": "hunter2"}))
        })?;
        Ok(())
    }
}

/// Build a bridge with arithmetic commands and the vault plugin, under the
/// given ACL configuration.
pub fn build_test_bridge(acl: AclConfig) -> Bridge {
    Bridge::builder()
        .command("add", |ctx| async move {
            match ctx.args::<PairArgs>() {
                Ok(args) => InvokeResult::ok(args.a + args.b),
                Err(e) => InvokeResult::error("DecodeError", e.to_string()),
            }
        })
        .command("divide", |ctx| async move {
            match ctx.args::<PairArgs>() {
                Ok(args) if args.b == 0 => {
                    InvokeResult::error("DivisionByZero", "Cannot divide by zero")
                }
                Ok(args) => InvokeResult::ok(args.a / args.b),
                Err(e) => InvokeResult::error("DecodeError", e.to_string()),
            }
        })
        .plugin(Arc::new(VaultPlugin))
        .acl(acl)
        .build()
        .expect("bridge builds")
}

/// ACL granting `vault.read` to the main view only.
pub fn vault_grant_for_main() -> AclConfig {
    AclConfig {
        permissions: vec![Permission {
            name: String::from("vault-read"),
            command: String::from("vault.read"),
            scopes: Vec::new(),
        }],
        capabilities: vec![Capability {
            name: String::from("main-vault"),
            targets: vec![CapabilityTarget::Label(String::from(MAIN_VIEW))],
            permissions: vec![String::from("vault-read")],
        }],
        ..AclConfig::default()
    }
}

/// Test helper: POST a JSON body to a command from the main view.
pub async fn post(bridge: &Bridge, command: &str, body: Value) -> InvokeResponse {
    let body = serde_json::to_vec(&body).expect("body serializes");
    bridge
        .handle_request(InvokeRequest::post(command, body, MAIN_VIEW))
        .await
}

/// Test helper: decode a response body as JSON.
pub fn body_json(response: &InvokeResponse) -> Value {
    response
        .body_json()
        .expect("response body should be valid JSON")
}
