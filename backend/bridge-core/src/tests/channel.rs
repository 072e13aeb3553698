// Unit tests for channels: send/close semantics, sequence assignment,
// marker resolution, and the destination-side ordering buffer.

use crate::channel::{ChannelRegistry, OrderingBuffer};
use crate::tests::{context_for, register_webview, wired_state};
use crate::webview::Webview;

use models::channel::channel_ref;

use serde_json::json;

#[test]
fn given_open_channel_when_sent_then_sequence_numbers_increase_from_zero() {
    let registry = ChannelRegistry::new();
    let (webview, mut receiver) = Webview::new("main");
    let channel = registry.create(webview);

    assert!(channel.send(&json!("a")));
    assert!(channel.send(&json!("b")));

    let scripts = receiver.drain();
    assert_eq!(scripts.len(), 2);
    assert!(scripts[0].contains(&format!("'{}', 0,", channel.token())));
    assert!(scripts[1].contains(&format!("'{}', 1,", channel.token())));
}

/// **VALUE**: Verifies send-after-close fails and produces no delivery.
///
/// **WHY THIS MATTERS**: Closed is a terminal state. A send that still
/// reaches the destination after the close notification would resurrect
/// buffering state the frontend already released.
///
/// **BUG THIS CATCHES**: Would catch the closed check happening after
/// sequence assignment and delivery.
#[test]
fn given_closed_channel_when_sent_then_returns_false_with_no_delivery() {
    let registry = ChannelRegistry::new();
    let (webview, mut receiver) = Webview::new("main");
    let channel = registry.create(webview);

    channel.close();
    let delivered_before = receiver.drain().len(); // close notification only
    assert_eq!(delivered_before, 1);

    assert!(!channel.send(&json!("late")));
    assert!(receiver.drain().is_empty(), "No delivery after close");
}

#[test]
fn given_closed_channel_when_closed_again_then_noop() {
    let registry = ChannelRegistry::new();
    let (webview, mut receiver) = Webview::new("main");
    let channel = registry.create(webview);

    channel.close();
    channel.close();

    assert_eq!(receiver.drain().len(), 1, "One close notification only");
}

#[test]
fn given_close_when_registry_checked_then_channel_removed() {
    let registry = ChannelRegistry::new();
    let (webview, _receiver) = Webview::new("main");
    let channel = registry.create(webview);
    assert_eq!(registry.len(), 1);

    channel.close();

    assert!(registry.is_empty());
    assert!(registry.get(channel.token()).is_none());
}

#[test]
fn given_known_token_when_resolved_then_existing_channel_returned() {
    let registry = ChannelRegistry::new();
    let (webview, _receiver) = Webview::new("main");
    let channel = registry.create(webview.clone());

    let resolved = registry
        .resolve(&channel_ref(channel.token()), &webview)
        .expect("resolves");

    assert_eq!(resolved.token(), channel.token());
    assert_eq!(registry.len(), 1, "Known tokens must not open a second channel");
}

#[test]
fn given_malformed_marker_when_resolved_then_missing_channel_error() {
    let registry = ChannelRegistry::new();
    let (webview, _receiver) = Webview::new("main");

    assert!(registry.resolve(&json!({}), &webview).is_err());
    assert!(registry.resolve(&json!({"__channelId": 42}), &webview).is_err());
}

/// **VALUE**: Verifies an unknown token implicitly opens a channel bound
/// to the originating view.
///
/// **WHY THIS MATTERS**: Channel tokens are minted by the frontend: the
/// caller embeds a fresh token in its arguments and expects the handler's
/// first resolution to bring the channel into existence. Treating unknown
/// tokens as errors reverses the allocation direction and makes every
/// frontend-initiated stream fail its first use.
///
/// **BUG THIS CATCHES**: Would catch resolution regressing to
/// lookup-or-error, where only backend-minted tokens ever work.
#[test]
fn given_frontend_minted_token_when_resolved_then_channel_opened_for_view() {
    let (state, webviews) = wired_state();
    let (webview, mut receiver) = register_webview(&webviews, "main");
    let ctx = context_for("stream", "{}", &state, Some(webview));

    let channel = ctx
        .channel_from_args(&channel_ref("frontend-minted-token"))
        .expect("unknown token opens a channel");

    assert_eq!(channel.token(), "frontend-minted-token");
    assert!(channel.send(&json!("first")));
    let scripts = receiver.drain();
    assert_eq!(scripts.len(), 1);
    assert!(scripts[0].contains("'frontend-minted-token', 0,"));

    // Second resolution under the same token reuses the open channel
    let again = ctx
        .channel_from_args(&channel_ref("frontend-minted-token"))
        .expect("token resolves");
    assert!(again.send(&json!("second")));
    assert!(receiver.drain()[0].contains("'frontend-minted-token', 1,"));
}

#[test]
fn given_torn_down_originating_view_when_resolved_then_missing_channel_error() {
    let (state, _webviews) = wired_state();
    let ctx = context_for("stream", "{}", &state, None);

    let result = ctx.channel_from_args(&channel_ref("frontend-minted-token"));

    assert!(result.is_err(), "No view to bind the new channel to");
}

#[test]
fn given_webview_teardown_when_channels_closed_then_only_that_views_channels_drop() {
    let registry = ChannelRegistry::new();
    let (main, _main_rx) = Webview::new("main");
    let (settings, _settings_rx) = Webview::new("settings");
    let main_channel = registry.create(main);
    let settings_channel = registry.create(settings);

    registry.close_for_webview("main");

    assert!(main_channel.is_closed());
    assert!(!settings_channel.is_closed());
    assert_eq!(registry.len(), 1);
}

/// **VALUE**: Verifies out-of-order arrivals release in sequence order.
///
/// **WHY THIS MATTERS**: Delivery rides an asynchronous script queue, so
/// arrival order is not transmission order. The ordering contract - never
/// hand k+1 to application logic before k - lives entirely in this buffer.
///
/// **BUG THIS CATCHES**: Would catch releasing arrivals immediately, or
/// releasing a contiguous run that doesn't start at next-expected.
#[test]
fn given_arrivals_b_c_a_when_buffered_then_released_a_b_c() {
    let mut buffer = OrderingBuffer::new();

    // Sent as [A=0, B=1, C=2]; arrives as [B, C, A]
    assert!(buffer.push(1, json!("B")).is_empty());
    assert!(buffer.push(2, json!("C")).is_empty());
    let released = buffer.push(0, json!("A"));

    assert_eq!(released, vec![json!("A"), json!("B"), json!("C")]);
    assert_eq!(buffer.next_expected(), 3);
    assert_eq!(buffer.buffered(), 0);
}

#[test]
fn given_gap_when_buffered_then_delivery_stalls_until_gap_fills() {
    let mut buffer = OrderingBuffer::new();

    assert_eq!(buffer.push(0, json!(0)), vec![json!(0)]);
    assert!(buffer.push(2, json!(2)).is_empty(), "Held behind missing 1");
    assert!(buffer.push(3, json!(3)).is_empty());

    let released = buffer.push(1, json!(1));
    assert_eq!(released, vec![json!(1), json!(2), json!(3)]);
}

/// **VALUE**: Verifies a send racing close() never queues a message after
/// the close notification.
///
/// **WHY THIS MATTERS**: The destination releases its buffering state on
/// the close notification; a message arriving afterwards resurrects state
/// for a channel the frontend considers gone.
///
/// **BUG THIS CATCHES**: Would catch the closed check moving outside the
/// counter lock, reopening the check-then-queue window against close().
#[test]
fn given_send_racing_close_when_drained_then_no_message_after_close_notification() {
    let registry = ChannelRegistry::new();
    let (webview, mut receiver) = Webview::new("main");
    let channel = registry.create(webview);

    let sender = channel.clone();
    let producer = std::thread::spawn(move || {
        for i in 0..64 {
            if !sender.send(&json!(i)) {
                break;
            }
        }
    });
    channel.close();
    producer.join().expect("producer thread completes");

    let scripts = receiver.drain();
    let close_at = scripts
        .iter()
        .position(|s| s.contains("channelClose"))
        .expect("close notification delivered");
    assert!(
        scripts[close_at + 1..]
            .iter()
            .all(|s| !s.contains("channelMessage")),
        "No message delivery may follow the close notification"
    );
}

#[test]
fn given_duplicate_or_stale_seq_when_buffered_then_dropped() {
    let mut buffer = OrderingBuffer::new();

    assert_eq!(buffer.push(0, json!("first")), vec![json!("first")]);
    assert!(buffer.push(0, json!("again")).is_empty(), "Stale dropped");

    assert!(buffer.push(2, json!("held")).is_empty());
    assert!(buffer.push(2, json!("dup")).is_empty(), "Duplicate dropped");
    assert_eq!(buffer.buffered(), 1);
}
