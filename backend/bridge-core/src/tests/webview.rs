// Unit tests for webview handles, the script queue, and the registry.

use crate::webview::{Webview, WebviewRegistry, channel_message_script, event_script};

#[tokio::test]
async fn given_queued_scripts_when_drained_then_delivered_in_eval_order() {
    let (webview, mut scripts) = Webview::new("main");

    assert!(webview.eval("first()"));
    assert!(webview.eval("second()"));
    assert!(webview.eval("third()"));

    assert_eq!(scripts.drain(), vec!["first()", "second()", "third()"]);
}

/// **VALUE**: Verifies eval never blocks waiting on the view and reports
/// teardown without failing.
///
/// **WHY THIS MATTERS**: Deliveries race view destruction constantly (a
/// channel producer does not know the user closed the window). Eval must
/// degrade to a dropped script, not an error or a hang.
///
/// **BUG THIS CATCHES**: Would catch eval propagating the send error or
/// panicking on a closed queue.
#[test]
fn given_torn_down_view_when_evaluating_then_returns_false() {
    let (webview, scripts) = Webview::new("main");
    drop(scripts);

    assert!(!webview.eval("lost()"));
}

#[test]
fn given_cloned_handle_when_evaluating_then_lands_on_shared_queue() {
    let (webview, mut scripts) = Webview::new("main");
    let clone = webview.clone();

    clone.eval("fromClone()");

    assert_eq!(scripts.drain(), vec!["fromClone()"]);
}

#[test]
fn given_registered_view_when_fetched_by_label_then_found() {
    let registry = WebviewRegistry::new();
    let (webview, _scripts) = Webview::new("settings");
    registry.register(webview);

    let fetched = registry.get("settings").expect("registered view found");

    assert_eq!(fetched.label(), "settings");
    assert!(registry.get("main").is_none());
}

#[test]
fn given_duplicate_label_when_registered_then_replaces_prior_view() {
    let registry = WebviewRegistry::new();
    let (first, mut first_scripts) = Webview::new("main");
    let (second, mut second_scripts) = Webview::new("main");
    registry.register(first);
    registry.register(second);

    registry
        .get("main")
        .expect("view present")
        .eval("hello()");

    assert!(first_scripts.drain().is_empty());
    assert_eq!(second_scripts.drain(), vec!["hello()"]);
    assert_eq!(registry.labels().len(), 1);
}

#[test]
fn given_removed_view_when_fetched_then_absent() {
    let registry = WebviewRegistry::new();
    let (webview, _scripts) = Webview::new("main");
    registry.register(webview);

    let removed = registry.remove("main");

    assert!(removed.is_some());
    assert!(registry.get("main").is_none());
    assert!(registry.remove("main").is_none(), "Second remove is a no-op");
}

#[test]
fn given_delivery_payloads_when_formatted_then_scripts_carry_all_fields() {
    let message = channel_message_script("tok-1", 7, "{\"pct\":50}");
    assert_eq!(
        message,
        "window.__SHELLBRIDGE__.channelMessage('tok-1', 7, {\"pct\":50})"
    );

    let event = event_script("download.progress", "{\"pct\":50}", "ev-1", 1740000000000);
    assert_eq!(
        event,
        "window.__SHELLBRIDGE__.event('download.progress', {\"pct\":50}, 'ev-1', 1740000000000)"
    );
}
