//! Channel wire shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Single-field record embedding a channel reference in request
/// arguments: `{"__channelId": "<token>"}`.
pub const CHANNEL_ID_KEY: &str = "__channelId";

/// A delivered channel message: `(channelToken, sequenceNumber, payload)`.
///
/// Delivery is asynchronous and may arrive out of transmission order; the
/// destination reorders by `seq` before handing payloads to application
/// logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub token: String,
    pub seq: u64,
    pub payload: Value,
}

/// Build the channel reference marker for embedding in request arguments.
pub fn channel_ref(token: &str) -> Value {
    json!({ CHANNEL_ID_KEY: token })
}
