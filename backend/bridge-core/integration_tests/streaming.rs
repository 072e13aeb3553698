use crate::helpers::{MAIN_VIEW, body_json, post};

use bridge_core::DEFERRED_RESPONSE_EVENT;
use bridge_core::bridge::Bridge;
use bridge_core::command::InvokeResult;

use models::channel::channel_ref;
use models::invoke::DEFERRED_KEY;

use serde_json::json;

/// **VALUE**: Verifies a streaming command's sends drain through the
/// destination view's script queue in sequence order, followed by the
/// close notification.
///
/// **WHY THIS MATTERS**: Channels are the only bulk backend→frontend
/// path; progress reporting and file streaming ride them. The destination
/// reorders on sequence numbers, so the numbers queued here must start at
/// zero and increase without gaps or the destination buffers forever.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Channel sends bypass the script queue and evaluate inline
/// - Sequence numbering skips or restarts mid-stream
/// - close() drops queued-but-undrained messages
#[tokio::test]
async fn given_streaming_command_when_invoked_then_messages_drain_in_sequence_order() {
    // GIVEN: A bridge with a command that streams three chunks and closes
    let bridge = Bridge::builder()
        .command("download", |ctx| async move {
            let channel = match ctx.open_channel() {
                Ok(channel) => channel,
                Err(e) => return InvokeResult::from(e),
            };
            for pct in [10, 55, 100] {
                channel.send(&json!({"pct": pct}));
            }
            let token = channel.token().to_string();
            channel.close();
            InvokeResult::ok(channel_ref(&token))
        })
        .build()
        .expect("bridge builds");
    let mut scripts = bridge.create_webview(MAIN_VIEW);

    // WHEN: The view invokes the streaming command
    let response = post(&bridge, "download", json!({})).await;
    assert!(response.status.is_success());
    let token = body_json(&response)["result"]["__channelId"]
        .as_str()
        .expect("response carries the channel token")
        .to_string();

    // THEN: Three ordered deliveries for that token, then the close
    let delivered = scripts.drain();
    assert_eq!(delivered.len(), 4);
    for (index, pct) in [10, 55, 100].into_iter().enumerate() {
        assert!(
            delivered[index].contains(&format!("'{token}', {index},")),
            "Delivery {index} must carry sequence number {index}"
        );
        assert!(delivered[index].contains(&format!("\"pct\":{pct}")));
    }
    assert!(delivered[3].contains("channelClose"));
    assert!(delivered[3].contains(&token));

    // THEN: The registry no longer tracks the closed channel
    assert!(bridge.channels().is_empty());
}

/// **VALUE**: Verifies the deferred-response round trip: the immediate
/// response carries a pending marker, and the responder later delivers
/// exactly one correlated completion event to the originating view.
///
/// **WHY THIS MATTERS**: Long-running work answers out of band; the
/// frontend matches the completion to its pending call purely by token.
/// A lost, uncorrelated, or duplicated completion strands or double-fires
/// the frontend promise.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The immediate response leaks a real value instead of the marker
/// - The completion event drops the token or targets the wrong view
/// - The first-call-wins guard on the responder is removed
#[tokio::test]
async fn given_deferred_command_when_resolved_then_one_correlated_completion_event() {
    // GIVEN: A command that defers and resolves before returning
    let bridge = Bridge::builder()
        .command("export", |ctx| async move {
            let (pending, responder) = ctx.defer_response();
            responder.resolve(json!({"path": "/tmp/export.zip"}));
            // Late duplicate attempts must be swallowed.
            responder.resolve(json!({"path": "/tmp/should-not-appear"}));
            pending
        })
        .build()
        .expect("bridge builds");
    let mut scripts = bridge.create_webview(MAIN_VIEW);

    // WHEN: The view invokes the deferred command
    let response = post(&bridge, "export", json!({})).await;

    // THEN: The immediate response is the pending marker
    assert!(response.status.is_success());
    let token = body_json(&response)["result"][DEFERRED_KEY]
        .as_str()
        .expect("pending marker carries the token")
        .to_string();

    // THEN: Exactly one completion event, correlated by token
    let delivered = scripts.drain();
    assert_eq!(delivered.len(), 1, "Second resolve must not deliver");
    assert!(delivered[0].contains(DEFERRED_RESPONSE_EVENT));
    assert!(delivered[0].contains(&token));
    assert!(delivered[0].contains("/tmp/export.zip"));
    assert!(!delivered[0].contains("should-not-appear"));
}

#[tokio::test]
async fn given_deferred_command_when_rejected_then_completion_carries_error() {
    let bridge = Bridge::builder()
        .command("export", |ctx| async move {
            let (pending, responder) = ctx.defer_response();
            responder.reject("ExportFailed", "Disk full");
            pending
        })
        .build()
        .expect("bridge builds");
    let mut scripts = bridge.create_webview(MAIN_VIEW);

    let response = post(&bridge, "export", json!({})).await;
    assert!(response.status.is_success(), "Deferral itself is a success");

    let delivered = scripts.drain();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].contains("\"ok\":false"));
    assert!(delivered[0].contains("ExportFailed"));
    assert!(delivered[0].contains("Disk full"));
}
