use crate::helpers::{MAIN_VIEW, body_json, build_test_bridge, post, vault_grant_for_main};

use bridge_core::protocol::InvokeRequest;

use common::HttpStatusCode;
use models::acl::AclConfig;

use serde_json::json;

/// **VALUE**: Verifies a registered command dispatches end-to-end: URI
/// parsing, argument decoding, handler execution, and result wrapping.
///
/// **WHY THIS MATTERS**: This is the primary request path every frontend
/// call takes. If any stage of it regresses, the application shell cannot
/// call into the backend at all.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Command names stop round-tripping through the custom scheme
/// - Body bytes are not handed to the handler's argument decoder
/// - Success values lose their `result` wrapping at the protocol edge
#[tokio::test]
async fn given_registered_command_when_invoked_then_returns_wrapped_result() {
    // GIVEN: A bridge with arithmetic commands and a live view
    let bridge = build_test_bridge(AclConfig::default());
    let _scripts = bridge.create_webview(MAIN_VIEW);

    // WHEN: The view invokes `add`
    let response = post(&bridge, "add", json!({"a": 2, "b": 3})).await;

    // THEN: The response is 200 with the wrapped sum
    assert_eq!(response.status, HttpStatusCode::OK);
    assert_eq!(body_json(&response), json!({"result": 5}));
}

#[tokio::test]
async fn given_handler_error_when_invoked_then_structured_error_with_client_status() {
    let bridge = build_test_bridge(AclConfig::default());
    let _scripts = bridge.create_webview(MAIN_VIEW);

    let response = post(&bridge, "divide", json!({"a": 1, "b": 0})).await;

    assert!(response.status.is_client_error());
    let body = body_json(&response);
    assert_eq!(body["error"], "DivisionByZero");
    assert_eq!(body["message"], "Cannot divide by zero");
}

#[tokio::test]
async fn given_unregistered_command_when_invoked_then_not_found() {
    let bridge = build_test_bridge(AclConfig::default());
    let _scripts = bridge.create_webview(MAIN_VIEW);

    let response = post(&bridge, "no_such_command", json!({})).await;

    assert_eq!(response.status, HttpStatusCode::NOT_FOUND);
    assert_eq!(body_json(&response)["error"], "UnknownCommand");
}

/// **VALUE**: Verifies plugin-namespaced commands are denied by default
/// and allowed once a capability grants them to the calling view.
///
/// **WHY THIS MATTERS**: The permission gate is the security boundary
/// between untrusted frontend script and plugin functionality. Default
/// deny plus explicit grants is the entire model; both halves must hold
/// on the real dispatch path, not just in unit tests of the manager.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Dispatch skips the permission check for namespaced commands
/// - A grant for one view leaks to other views
/// - The denial leaks handler output instead of a 403
#[tokio::test]
async fn given_plugin_command_when_ungranted_then_forbidden_and_granted_then_allowed() {
    // GIVEN: Default-deny for plugin commands, no grants
    let bridge = build_test_bridge(AclConfig::default());
    let _scripts = bridge.create_webview(MAIN_VIEW);

    // WHEN: The view invokes the vault plugin's command
    let denied = post(&bridge, "vault.read", json!({})).await;

    // THEN: 403 with the reserved denial code, no payload leak
    assert_eq!(denied.status, HttpStatusCode::FORBIDDEN);
    let body = body_json(&denied);
    assert_eq!(body["error"], "PermissionDenied");
    assert!(!String::from_utf8_lossy(&denied.body).contains("hunter2"));

    // GIVEN: A capability granting vault.read to the main view
    let granted_bridge = build_test_bridge(vault_grant_for_main());
    let _scripts = granted_bridge.create_webview(MAIN_VIEW);

    // WHEN: The granted view invokes it
    let allowed = post(&granted_bridge, "vault.read", json!({})).await;

    // THEN: The handler runs and its value comes back wrapped
    assert_eq!(allowed.status, HttpStatusCode::OK);
    assert_eq!(body_json(&allowed)["result"]["secret"], "hunter2");

    // WHEN: A different view invokes it under the same config
    let other = granted_bridge
        .handle_request(InvokeRequest::post("vault.read", b"{}".to_vec(), "settings"))
        .await;

    // THEN: The label-scoped grant does not cover it
    assert_eq!(other.status, HttpStatusCode::FORBIDDEN);
}

#[tokio::test]
async fn given_foreign_scheme_when_requested_then_decode_error() {
    let bridge = build_test_bridge(AclConfig::default());

    let response = bridge
        .handle_request(InvokeRequest {
            uri: String::from("https://example.com/add"),
            method: String::from("POST"),
            headers: Default::default(),
            body: Vec::new(),
            webview_label: String::from(MAIN_VIEW),
        })
        .await;

    assert!(response.status.is_client_error());
    assert_eq!(body_json(&response)["error"], "DecodeError");
}
