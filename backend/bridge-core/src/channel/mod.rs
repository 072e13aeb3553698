//! Ordered backend→frontend streaming channels.
//!
//! A channel is a unidirectional, strictly-ordered stream identified by a
//! unique token and bound to one destination view. Payload serialization
//! runs unlocked; sequence assignment and queueing hold the counter lock,
//! which close() also takes so its notification is ordered after every
//! completed send. Delivery rides the
//! destination view's script queue, so it is asynchronous and may arrive
//! out of transmission order - the destination reorders with
//! [`OrderingBuffer`] before handing payloads to application logic.

pub mod ordering;

pub use ordering::OrderingBuffer;

use crate::error::channel::ChannelError;
use crate::webview::{Webview, channel_close_script, channel_message_script};

use common::ErrorLocation;
use models::channel::CHANNEL_ID_KEY;

use std::collections::HashMap;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use log::{debug, info};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

type ChannelMap = RwLock<HashMap<String, Channel>>;

struct ChannelInner {
    token: String,
    webview: Webview,
    /// Held only for the sequence read-increment, never across delivery.
    seq: Mutex<u64>,
    closed: AtomicBool,
    registry: Weak<ChannelMap>,
}

/// Handle to one open channel. `Clone` shares the same stream.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl Channel {
    pub fn token(&self) -> &str {
        &self.inner.token
    }

    /// Label of the destination view.
    pub fn webview_label(&self) -> &str {
        self.inner.webview.label()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Send one value down the channel.
    ///
    /// Returns `false` if the channel is closed. Payload serialization runs
    /// unlocked; the closed check, sequence assignment, and queueing happen
    /// together under the counter lock so no message can be queued after
    /// the close notification. Delivery failures (destination torn down)
    /// are swallowed; there is no acknowledgment path.
    pub fn send<T: Serialize>(&self, value: &T) -> bool {
        if self.is_closed() {
            return false;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                debug!(
                    "Dropping unserializable payload on channel {}: {e}",
                    self.inner.token
                );
                return false;
            }
        };

        let mut counter = self.inner.seq.lock().expect("channel seq lock poisoned");
        // Re-checked under the lock: close() flips the flag and delivers
        // its notification while holding this same lock.
        if self.is_closed() {
            return false;
        }
        let seq = *counter;
        *counter += 1;

        self.inner
            .webview
            .eval(channel_message_script(&self.inner.token, seq, &payload));
        true
    }

    /// Close the channel. Idempotent; closing twice is a no-op.
    ///
    /// Notifies the destination so it can release its buffering state, and
    /// removes the channel from the registry. The flag flip and the close
    /// notification happen under the counter lock, ordering them against
    /// racing sends.
    pub fn close(&self) {
        {
            let _counter = self.inner.seq.lock().expect("channel seq lock poisoned");
            if self.inner.closed.swap(true, Ordering::SeqCst) {
                return;
            }

            debug!("Closing channel {}", self.inner.token);
            self.inner
                .webview
                .eval(channel_close_script(&self.inner.token));
        }

        if let Some(registry) = self.inner.registry.upgrade() {
            registry
                .write()
                .expect("channel registry poisoned")
                .remove(&self.inner.token);
        }
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("token", &self.inner.token)
            .field("webview", &self.inner.webview.label())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Registry of open channels, keyed by token.
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    channels: Arc<ChannelMap>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel to the given view. The token is a fresh UUID.
    pub fn create(&self, webview: Webview) -> Channel {
        self.insert(Uuid::new_v4().to_string(), webview)
    }

    fn insert(&self, token: String, webview: Webview) -> Channel {
        let channel = Channel {
            inner: Arc::new(ChannelInner {
                token: token.clone(),
                webview,
                seq: Mutex::new(0),
                closed: AtomicBool::new(false),
                registry: Arc::downgrade(&self.channels),
            }),
        };

        self.channels
            .write()
            .expect("channel registry poisoned")
            .insert(token.clone(), channel.clone());
        debug!("Opened channel {token}");
        channel
    }

    /// Look up a channel by token.
    pub fn get(&self, token: &str) -> Option<Channel> {
        self.channels
            .read()
            .expect("channel registry poisoned")
            .get(token)
            .cloned()
    }

    /// Resolve a `{"__channelId": "<token>"}` marker value into a live
    /// channel.
    ///
    /// Tokens are frontend-minted: an unknown token implicitly opens a new
    /// channel under it, bound to the given originating view. A known token
    /// returns the already-open channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Missing`] when the marker is absent or
    /// malformed.
    pub fn resolve(&self, marker: &Value, webview: &Webview) -> Result<Channel, ChannelError> {
        let token = marker
            .get(CHANNEL_ID_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ChannelError::Missing {
                message: format!("Expected a {{\"{CHANNEL_ID_KEY}\": ...}} channel reference"),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match self.get(token) {
            Some(channel) => Ok(channel),
            None => Ok(self.insert(token.to_string(), webview.clone())),
        }
    }

    /// Number of currently open channels.
    pub fn len(&self) -> usize {
        self.channels
            .read()
            .expect("channel registry poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close and drop every channel owned by a torn-down view.
    pub fn close_for_webview(&self, label: &str) {
        let owned: Vec<Channel> = {
            let channels = self.channels.read().expect("channel registry poisoned");
            channels
                .values()
                .filter(|c| c.webview_label() == label)
                .cloned()
                .collect()
        };

        if !owned.is_empty() {
            info!("Closing {} channel(s) for webview '{label}'", owned.len());
        }
        for channel in owned {
            channel.close();
        }
    }
}
