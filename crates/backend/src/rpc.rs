//! JSON-RPC 2.0 envelopes exchanged with the MCP endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version written into every outbound envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Outbound request envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method,
            params,
        }
    }
}

/// Inbound response envelope.
///
/// The client never correlates `id` with the request it sent; it is kept for
/// diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// The `error` member of a response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcResponse {
    /// Text of the first content item of a `tools/call` result.
    ///
    /// Returns `None` when the result has no content items or the first one
    /// carries no `text`.
    pub fn first_content_text(&self) -> Option<&str> {
        self.result
            .as_ref()?
            .get("content")?
            .as_array()?
            .first()?
            .get("text")?
            .as_str()
    }

    /// Raw entries of a `tools/list` result.
    pub fn tool_entries(&self) -> Option<&Vec<Value>> {
        self.result.as_ref()?.get("tools")?.as_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_as_jsonrpc_envelope() {
        let request = RpcRequest::new(7, "tools/list", json!({}));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "jsonrpc": "2.0", "id": 7, "method": "tools/list", "params": {} })
        );
    }

    #[test]
    fn response_with_error_member_parses() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32601, "message": "Method not found" }
        }))
        .unwrap();
        let error = response.error.expect("error member");
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found");
        assert!(response.result.is_none());
    }

    #[test]
    fn first_content_text_reads_first_item_only() {
        let response: RpcResponse = serde_json::from_value(json!({
            "result": { "content": [ { "type": "text", "text": "first" }, { "type": "text", "text": "second" } ] }
        }))
        .unwrap();
        assert_eq!(response.first_content_text(), Some("first"));
    }

    #[test]
    fn first_content_text_is_none_for_empty_content() {
        let response: RpcResponse = serde_json::from_value(json!({ "result": { "content": [] } })).unwrap();
        assert_eq!(response.first_content_text(), None);

        let response: RpcResponse = serde_json::from_value(json!({ "result": {} })).unwrap();
        assert_eq!(response.first_content_text(), None);
    }
}
