//! Bidirectional named publish/subscribe over the bridge transport.
//!
//! Backend→frontend events are serialized once per emit, stamped with a
//! fresh id and timestamp, and delivered to every resolved destination via
//! script injection. Backend-side listeners registered for the event name
//! are notified independently of any per-view delivery failure.
//! Frontend-originated events arrive through the reserved internal command
//! and are routed to backend listeners only - never rebroadcast.
//!
//! # Locking
//!
//! The listener table is behind its own short-lived lock; callbacks run
//! after the lock is released.

use crate::webview::{WebviewRegistry, event_script};

use models::event::{EventEnvelope, FrontendEvent};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Where an emitted event goes.
#[derive(Clone)]
pub enum EventTarget {
    /// Every registered view.
    All,
    /// One view, by exact label.
    Webview(String),
    /// Views whose label satisfies the predicate.
    Filter(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl EventTarget {
    pub fn webview(label: impl Into<String>) -> Self {
        EventTarget::Webview(label.into())
    }

    pub fn filter<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        EventTarget::Filter(Arc::new(predicate))
    }
}

impl std::fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventTarget::All => write!(f, "EventTarget::All"),
            EventTarget::Webview(label) => write!(f, "EventTarget::Webview({label})"),
            EventTarget::Filter(_) => write!(f, "EventTarget::Filter(..)"),
        }
    }
}

/// Opaque handle identifying one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

type ListenerCallback = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

struct Listener {
    handle: ListenerHandle,
    once: bool,
    callback: ListenerCallback,
}

type EventObserver = Arc<dyn Fn(&EventEnvelope) + Send + Sync>;

struct EventBusInner {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
    next_handle: AtomicU64,
    webviews: WebviewRegistry,
    /// Bus-wide observer; the bridge points this at the plugin host so
    /// plugins see every event regardless of name.
    observer: RwLock<Option<EventObserver>>,
}

/// The event bus. `Clone` shares the same listener table.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

impl EventBus {
    pub fn new(webviews: WebviewRegistry) -> Self {
        Self {
            inner: Arc::new(EventBusInner {
                listeners: RwLock::new(HashMap::new()),
                next_handle: AtomicU64::new(1),
                webviews,
                observer: RwLock::new(None),
            }),
        }
    }

    /// Install the bus-wide observer. Replaces any prior observer.
    pub fn set_observer<F>(&self, observer: F)
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        *self.inner.observer.write().expect("event observer poisoned") = Some(Arc::new(observer));
    }

    /// Register a backend listener for a named event.
    pub fn listen<F>(&self, name: impl Into<String>, callback: F) -> ListenerHandle
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        self.register(name.into(), false, Arc::new(callback))
    }

    /// Register a listener that auto-unregisters after its first delivery.
    pub fn once<F>(&self, name: impl Into<String>, callback: F) -> ListenerHandle
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        self.register(name.into(), true, Arc::new(callback))
    }

    fn register(&self, name: String, once: bool, callback: ListenerCallback) -> ListenerHandle {
        let handle = ListenerHandle(self.inner.next_handle.fetch_add(1, Ordering::SeqCst));
        let mut listeners = self.inner.listeners.write().expect("listener table poisoned");
        listeners.entry(name).or_default().push(Listener {
            handle,
            once,
            callback,
        });
        handle
    }

    /// Remove one listener by handle. Unknown handles are ignored.
    pub fn unlisten(&self, handle: ListenerHandle) {
        let mut listeners = self.inner.listeners.write().expect("listener table poisoned");
        for entries in listeners.values_mut() {
            entries.retain(|l| l.handle != handle);
        }
        listeners.retain(|_, entries| !entries.is_empty());
    }

    /// Remove every listener for `name`, or all listeners when `None`.
    pub fn remove_all_listeners(&self, name: Option<&str>) {
        let mut listeners = self.inner.listeners.write().expect("listener table poisoned");
        match name {
            Some(name) => {
                listeners.remove(name);
            }
            None => listeners.clear(),
        }
    }

    /// Number of listeners registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.inner
            .listeners
            .read()
            .expect("listener table poisoned")
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Emit a named event to the given target.
    ///
    /// The payload is serialized once; each resolved destination gets one
    /// script-injection delivery carrying the shared id and timestamp.
    /// Backend listeners are notified afterwards, regardless of delivery
    /// failures to any one view. Returns the envelope for callers that
    /// correlate on the event id.
    pub fn emit<T: Serialize>(&self, name: &str, payload: &T, target: &EventTarget) -> EventEnvelope {
        let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
        let envelope = EventEnvelope {
            event: name.to_string(),
            payload,
            id: Uuid::new_v4().to_string(),
            timestamp_millis: now_millis(),
        };

        let payload_json =
            serde_json::to_string(&envelope.payload).unwrap_or_else(|_| String::from("null"));

        for label in self.resolve_destinations(target) {
            if let Some(webview) = self.inner.webviews.get(&label) {
                webview.eval(event_script(
                    &envelope.event,
                    &payload_json,
                    &envelope.id,
                    envelope.timestamp_millis,
                ));
            }
        }

        self.notify_listeners(&envelope);
        envelope
    }

    /// Route a frontend-originated event to backend listeners only.
    pub fn handle_frontend(&self, event: FrontendEvent) -> EventEnvelope {
        debug!("Frontend event '{}'", event.event);
        let envelope = EventEnvelope {
            event: event.event,
            payload: event.payload,
            id: Uuid::new_v4().to_string(),
            timestamp_millis: now_millis(),
        };
        self.notify_listeners(&envelope);
        envelope
    }

    fn resolve_destinations(&self, target: &EventTarget) -> Vec<String> {
        match target {
            EventTarget::All => self.inner.webviews.labels(),
            EventTarget::Webview(label) => vec![label.clone()],
            EventTarget::Filter(predicate) => self
                .inner
                .webviews
                .labels()
                .into_iter()
                .filter(|label| predicate(label))
                .collect(),
        }
    }

    /// Invoke matching backend listeners outside the table lock, dropping
    /// `once` registrations first.
    fn notify_listeners(&self, envelope: &EventEnvelope) {
        let observer = self
            .inner
            .observer
            .read()
            .expect("event observer poisoned")
            .clone();
        if let Some(observer) = observer {
            observer(envelope);
        }

        let callbacks: Vec<ListenerCallback> = {
            let mut listeners = self.inner.listeners.write().expect("listener table poisoned");
            let Some(entries) = listeners.get_mut(&envelope.event) else {
                return;
            };
            let callbacks = entries.iter().map(|l| Arc::clone(&l.callback)).collect();
            entries.retain(|l| !l.once);
            if entries.is_empty() {
                listeners.remove(&envelope.event);
            }
            callbacks
        };

        for callback in callbacks {
            callback(envelope);
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
