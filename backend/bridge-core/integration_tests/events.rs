use crate::helpers::{MAIN_VIEW, build_test_bridge, post};

use bridge_core::EVENT_COMMAND;
use bridge_core::event::EventTarget;

use models::acl::AclConfig;

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

/// **VALUE**: Verifies frontend-originated events reach backend listeners
/// through the reserved event command.
///
/// **WHY THIS MATTERS**: The frontend has no other path to the event bus;
/// everything it publishes rides the same transport as commands, on one
/// reserved name. If that routing breaks, frontend→backend eventing is
/// silently dead while commands keep working.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The reserved name falls through to command dispatch (404)
/// - The payload is lost or re-wrapped before listeners see it
/// - Ingested events echo back to views and loop
#[tokio::test]
async fn given_frontend_event_when_posted_then_backend_listener_receives_payload() {
    // GIVEN: A bridge with a backend listener and a live view
    let bridge = build_test_bridge(AclConfig::default());
    let mut scripts = bridge.create_webview(MAIN_VIEW);

    let received: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    bridge.listen("settings.changed", move |envelope| {
        sink.lock().unwrap().push(envelope.payload.clone());
    });

    // WHEN: The frontend publishes an event through the reserved command
    let response = post(
        &bridge,
        EVENT_COMMAND,
        json!({"event": "settings.changed", "payload": {"theme": "dark"}}),
    )
    .await;

    // THEN: Accepted, the listener saw the payload, and nothing echoed back
    assert!(response.status.is_success());
    assert_eq!(*received.lock().unwrap(), vec![json!({"theme": "dark"})]);
    assert!(
        scripts.drain().is_empty(),
        "Frontend-originated events must not be re-broadcast to views"
    );
}

#[tokio::test]
async fn given_malformed_event_body_when_posted_then_decode_error() {
    let bridge = build_test_bridge(AclConfig::default());
    let _scripts = bridge.create_webview(MAIN_VIEW);

    let response = post(&bridge, EVENT_COMMAND, json!({"payload": 1})).await;

    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn given_backend_emit_when_targeted_at_view_then_delivery_rides_script_queue() {
    let bridge = build_test_bridge(AclConfig::default());
    let mut main_scripts = bridge.create_webview(MAIN_VIEW);
    let mut settings_scripts = bridge.create_webview("settings");

    let envelope = bridge.emit(
        "download.progress",
        &json!({"pct": 40}),
        &EventTarget::webview(MAIN_VIEW),
    );

    let delivered = main_scripts.drain();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].contains("download.progress"));
    assert!(delivered[0].contains(&envelope.id));
    assert!(
        settings_scripts.drain().is_empty(),
        "Label-targeted emission must not reach other views"
    );
}
