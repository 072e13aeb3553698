//! Dispatch results and the error-code taxonomy.

use crate::error::channel::ChannelError;

use serde::Serialize;
use serde_json::Value;

/// Error codes the dispatch layer itself produces. Handler-chosen codes
/// pass through verbatim.
pub mod codes {
    /// No handler registered under the invoked name.
    pub const UNKNOWN_COMMAND: &str = "UnknownCommand";
    /// Argument deserialization failed; the handler never ran.
    pub const DECODE_ERROR: &str = "DecodeError";
    /// The permission manager denied the invocation; the handler never ran.
    pub const PERMISSION_DENIED: &str = "PermissionDenied";
    /// A required channel reference argument was absent or malformed.
    pub const MISSING_CHANNEL: &str = "MissingChannel";
    /// An uncaught handler failure, coerced to a generic code.
    pub const INTERNAL: &str = "Internal";
}

/// Outcome of one command invocation. Exactly one variant is populated.
///
/// Dispatch never propagates a failure past its own boundary - every
/// outcome, success or error, is one of these values.
#[derive(Debug, Clone, PartialEq)]
pub enum InvokeResult {
    /// Success with a serializable value; wrapped under a `result` key at
    /// the protocol edge.
    Json(Value),
    /// Binary payload with its own media type; bypasses JSON wrapping.
    Binary { data: Vec<u8>, content_type: String },
    /// Structured error with a code and message.
    Error { code: String, message: String },
}

impl InvokeResult {
    /// Success result from any serializable value.
    ///
    /// Serialization happens exactly once, here on the sending side; a
    /// value that fails to serialize becomes an internal error result.
    pub fn ok<T: Serialize>(value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => InvokeResult::Json(value),
            Err(e) => InvokeResult::error(codes::INTERNAL, format!("Serialization failed: {e}")),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        InvokeResult::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn binary(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        InvokeResult::Binary {
            data,
            content_type: content_type.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, InvokeResult::Error { .. })
    }

    /// The error code, if this is an error result.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            InvokeResult::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// A failed channel resolution maps onto the reserved missing-channel code.
impl From<ChannelError> for InvokeResult {
    fn from(error: ChannelError) -> Self {
        InvokeResult::error(codes::MISSING_CHANNEL, error.to_string())
    }
}
