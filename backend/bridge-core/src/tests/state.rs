// Unit tests for the type-keyed state container.

use crate::state::StateContainer;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, PartialEq)]
struct Settings {
    theme: String,
}

struct Counter {
    hits: AtomicU64,
}

#[test]
fn given_managed_value_when_fetched_then_same_instance_returned() {
    let state = StateContainer::new();
    state.manage(Settings {
        theme: String::from("dark"),
    });

    let settings = state.get::<Settings>().expect("managed value present");

    assert_eq!(settings.theme, "dark");
}

#[test]
fn given_unmanaged_type_when_fetched_then_none() {
    let state = StateContainer::new();
    state.manage(Settings {
        theme: String::from("dark"),
    });

    assert!(state.get::<Counter>().is_none());
}

/// **VALUE**: Verifies all container clones see one shared instance per
/// type, not per-clone copies.
///
/// **WHY THIS MATTERS**: The container is cloned into every request
/// context. If clones held independent maps, a counter bumped by one
/// handler would be invisible to the next.
///
/// **BUG THIS CATCHES**: Would catch a derived `Clone` on the inner map
/// instead of on the shared `Arc` handle.
#[test]
fn given_container_clone_when_state_mutated_then_visible_through_original() {
    let state = StateContainer::new();
    state.manage(Counter {
        hits: AtomicU64::new(0),
    });

    let clone = state.clone();
    clone
        .require::<Counter>()
        .hits
        .fetch_add(3, Ordering::SeqCst);

    assert_eq!(state.require::<Counter>().hits.load(Ordering::SeqCst), 3);
}

#[test]
fn given_type_already_managed_when_managed_again_then_replaced() {
    let state = StateContainer::new();
    state.manage(Settings {
        theme: String::from("dark"),
    });
    state.manage(Settings {
        theme: String::from("light"),
    });

    assert_eq!(state.require::<Settings>().theme, "light");
}

#[test]
fn given_value_handed_out_when_type_replaced_then_old_handle_still_valid() {
    let state = StateContainer::new();
    state.manage(Settings {
        theme: String::from("dark"),
    });
    let old: Arc<Settings> = state.require::<Settings>();

    state.manage(Settings {
        theme: String::from("light"),
    });

    assert_eq!(old.theme, "dark", "Existing handles keep the old value");
    assert_eq!(state.require::<Settings>().theme, "light");
}

#[test]
#[should_panic(expected = "required state not managed")]
fn given_unmanaged_type_when_required_then_panics() {
    let state = StateContainer::new();

    let _ = state.require::<Settings>();
}
