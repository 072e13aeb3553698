//! Protocol front door: request parsing and response encoding.
//!
//! The transport carries commands on a custom scheme
//! (`shell://<command-name>`) with an HTTP-like method, headers, and a JSON
//! body, and expects status/headers/body triples back. This module owns
//! the pure halves of that exchange; the bridge coordinator wires them to
//! dispatch.

use crate::SCHEME_PREFIX;
use crate::command::result::{InvokeResult, codes};
use crate::error::protocol::ProtocolError;

use common::{ErrorLocation, HttpStatusCode};
use models::invoke::{ErrorBody, ResultBody};

use std::collections::HashMap;
use std::panic::Location;

/// Media type of JSON response bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Header naming a response body's media type.
pub const CONTENT_TYPE_HEADER: &str = "content-type";

/// One inbound request from the rendering surface.
#[derive(Debug, Clone)]
pub struct InvokeRequest {
    /// Full request URI, `shell://<command-name>`.
    pub uri: String,
    /// HTTP-like method; the engine does not route on it.
    pub method: String,
    pub headers: HashMap<String, String>,
    /// Raw JSON body bytes (may be empty).
    pub body: Vec<u8>,
    /// Label of the view that issued the request, identified by the
    /// transport.
    pub webview_label: String,
}

impl InvokeRequest {
    /// Convenience constructor for the common POST-with-JSON-body case.
    pub fn post(
        command: &str,
        body: impl Into<Vec<u8>>,
        webview_label: impl Into<String>,
    ) -> Self {
        Self {
            uri: format!("{SCHEME_PREFIX}{command}"),
            method: String::from("POST"),
            headers: HashMap::new(),
            body: body.into(),
            webview_label: webview_label.into(),
        }
    }
}

/// One outbound response: HTTP-like status/headers/body triple.
#[derive(Debug, Clone)]
pub struct InvokeResponse {
    pub status: HttpStatusCode,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl InvokeResponse {
    /// Parse the response body as JSON (test/diagnostic convenience).
    pub fn body_json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Extract the command name from a request URI.
///
/// # Errors
///
/// Returns [`ProtocolError::BadUri`] when the scheme is wrong or the
/// command name is empty.
pub fn parse_command(uri: &str) -> Result<&str, ProtocolError> {
    let command = uri
        .strip_prefix(SCHEME_PREFIX)
        .ok_or_else(|| ProtocolError::BadUri {
            message: format!("Expected a {SCHEME_PREFIX} URI, got '{uri}'"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let command = command.trim_end_matches('/');
    if command.is_empty() {
        return Err(ProtocolError::BadUri {
            message: format!("Empty command name in URI '{uri}'"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    Ok(command)
}

/// Encode a dispatch outcome into the wire response.
///
/// Successes wrap the value as `{"result": <value>}`; errors serialize
/// `{"error": <code>, "message": <text>}` under a status derived from the
/// code; binary results set their own media type with no wrapping.
pub fn encode_result(result: InvokeResult) -> InvokeResponse {
    match result {
        InvokeResult::Json(value) => {
            let body = serde_json::to_vec(&ResultBody { result: value })
                .unwrap_or_else(|_| Vec::from(&b"{\"result\":null}"[..]));
            InvokeResponse {
                status: HttpStatusCode::OK,
                headers: json_headers(),
                body,
            }
        }
        InvokeResult::Binary { data, content_type } => InvokeResponse {
            status: HttpStatusCode::OK,
            headers: HashMap::from([(String::from(CONTENT_TYPE_HEADER), content_type)]),
            body: data,
        },
        InvokeResult::Error { code, message } => {
            let status = status_for_code(&code);
            let body = serde_json::to_vec(&ErrorBody {
                error: code,
                message,
            })
            .unwrap_or_default();
            InvokeResponse {
                status,
                headers: json_headers(),
                body,
            }
        }
    }
}

/// Map a dispatch error code onto an HTTP-like status.
///
/// Handler-chosen codes land on 400: the failure is structured and the
/// caller's to interpret, not a transport fault.
fn status_for_code(code: &str) -> HttpStatusCode {
    match code {
        codes::UNKNOWN_COMMAND => HttpStatusCode::NOT_FOUND,
        codes::PERMISSION_DENIED => HttpStatusCode::FORBIDDEN,
        codes::INTERNAL => HttpStatusCode::INTERNAL_ERROR,
        _ => HttpStatusCode::BAD_REQUEST,
    }
}

fn json_headers() -> HashMap<String, String> {
    HashMap::from([(
        String::from(CONTENT_TYPE_HEADER),
        String::from(CONTENT_TYPE_JSON),
    )])
}
