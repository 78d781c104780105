//! Decoding of response bodies that may be framed as Server-Sent Events.
//!
//! The MCP endpoint answers a POST either with a plain JSON envelope or with a
//! short event stream such as `event: message\ndata: {...}\n\n`. The whole
//! body is read before decoding; nothing here is streamed.

use crate::error::BackendError;
use crate::rpc::RpcResponse;

/// Decode a complete response body into an RPC envelope.
///
/// A body that starts with an `event:` or `data:` field, or carries a `data:`
/// line anywhere after the first line, is treated as an event stream and the
/// first non-empty `data:` payload is parsed. Anything else is parsed as JSON
/// directly.
pub fn decode_body(body: &str) -> Result<RpcResponse, BackendError> {
    if is_event_stream(body) {
        let payload = first_data_payload(body).ok_or_else(|| BackendError::malformed("No data found in SSE response"))?;
        return serde_json::from_str(payload)
            .map_err(|e| BackendError::malformed(format!("invalid JSON in SSE data line: {e}")));
    }

    serde_json::from_str(body).map_err(|e| BackendError::malformed(format!("invalid JSON response: {e}")))
}

fn is_event_stream(body: &str) -> bool {
    body.starts_with("event:") || body.starts_with("data:") || body.contains("\ndata:")
}

fn first_data_payload(body: &str) -> Option<&str> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .find(|payload| !payload.is_empty())
}
