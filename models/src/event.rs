//! Event envelopes crossing the bridge in both directions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A delivered backend→frontend event.
///
/// `id` and `timestamp_millis` are generated at emission time, not at
/// listener-registration time, so every delivery of one emit call shares
/// the same identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: String,
    pub payload: Value,
    pub id: String,
    pub timestamp_millis: u64,
}

/// A frontend-originated event, posted to the reserved event command as
/// `{"event": "<name>", "payload": <value>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendEvent {
    pub event: String,
    #[serde(default)]
    pub payload: Value,
}
