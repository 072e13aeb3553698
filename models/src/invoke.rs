//! Invoke response wire bodies.
//!
//! Successful JSON responses wrap the payload under a single `result` key;
//! errors serialize `{"error": <code>, "message": <text>}`. Binary
//! responses carry their own media type and bypass both shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Well-known key marking a deferred (pending) response body.
pub const DEFERRED_KEY: &str = "__deferred__";

/// Success body: `{"result": <value>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultBody {
    pub result: Value,
}

/// Error body: `{"error": <code>, "message": <text>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Build the pending marker a deferred command returns in place of a
/// result: `{"__deferred__": "<token>"}`. The frontend suspends its own
/// promise keyed by the token until the correlated response event arrives.
pub fn deferred_marker(token: &str) -> Value {
    json!({ DEFERRED_KEY: token })
}
