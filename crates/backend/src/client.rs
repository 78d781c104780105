//! Client for the n8n MCP workflow backend.
//!
//! Every operation is a single JSON-RPC POST against the configured endpoint.
//! [`WorkflowBackendClient::rpc_call`] is the only method that can fail; the
//! public operations fold failures into values the UI can show directly.

use std::error::Error as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Value, json};
use strata_types::{ClientConfig, ConnectionReport, ToolDescriptor, WorkflowSummary};
use strata_util::{mask_secret, redact_sensitive};
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::rpc::{RpcRequest, RpcResponse};
use crate::sse::decode_body;
use crate::trace::extract_reply;

/// Accept header advertising both response framings.
pub const ACCEPT_JSON_OR_EVENT_STREAM: &str = "application/json, text/event-stream";
/// Header carrying the secondary credential id.
pub const ACCESS_CLIENT_ID_HEADER: &str = "CF-Access-Client-Id";
/// Header carrying the secondary credential secret.
pub const ACCESS_CLIENT_SECRET_HEADER: &str = "CF-Access-Client-Secret";
/// Reply returned when a successful call carries no text.
pub const NO_RESPONSE: &str = "No response received";

const EXECUTE_WORKFLOW_TOOL: &str = "execute_workflow";
const SEARCH_WORKFLOWS_TOOL: &str = "search_workflows";

/// JSON-RPC client for a remote workflow-execution server.
///
/// The client is constructed explicitly and shared by reference; it holds no
/// global state. Concurrent calls are independent: each gets its own request
/// id and the configuration snapshot current when it started.
#[derive(Debug)]
pub struct WorkflowBackendClient {
    http: Client,
    timeout: Option<Duration>,
    config: RwLock<Arc<ClientConfig>>,
    next_request_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RemoteTool {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkflowPage {
    data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RemoteWorkflow {
    id: Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
}

impl RemoteWorkflow {
    fn into_summary(self) -> Option<WorkflowSummary> {
        let id = match self.id {
            Value::String(id) => id,
            Value::Number(id) => id.to_string(),
            _ => return None,
        };
        Some(WorkflowSummary {
            id,
            name: self.name,
            description: self.description,
        })
    }
}

impl WorkflowBackendClient {
    /// Display name of this provider.
    pub const NAME: &'static str = "N8N MCP";

    /// Creates a client whose requests wait for the workflow as long as it runs.
    pub fn new(config: ClientConfig) -> Result<Self, BackendError> {
        Self::build(config, None)
    }

    /// Creates a client that abandons any HTTP round trip after `timeout`.
    pub fn with_timeout(config: ClientConfig, timeout: Duration) -> Result<Self, BackendError> {
        Self::build(config, Some(timeout))
    }

    fn build(config: ClientConfig, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(BackendError::HttpClient)?;
        Ok(Self {
            http,
            timeout,
            config: RwLock::new(Arc::new(config)),
            next_request_id: AtomicU64::new(1),
        })
    }

    /// Replace all connection parameters at once.
    ///
    /// Calls already in flight finish with the configuration they started with.
    /// The request id counter is not reset.
    pub fn configure(&self, config: ClientConfig) {
        let mut current = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(config);
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Arc<ClientConfig> {
        Arc::clone(&self.config.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// True when both the endpoint and the bearer token are set. No network access.
    pub fn is_available(&self) -> bool {
        let config = self.config();
        !config.url.is_empty() && !config.token.is_empty()
    }

    /// Send one JSON-RPC request and decode the response envelope.
    ///
    /// A non-success HTTP status fails with [`BackendError::Transport`] before
    /// the body is inspected. A JSON-RPC `error` member is returned inside the
    /// `Ok` envelope.
    pub async fn rpc_call(&self, method: &str, params: Value) -> Result<RpcResponse, BackendError> {
        let config = self.config();
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let envelope = RpcRequest::new(id, method, params);
        debug!(target: "strata_backend", id, method, url = %config.url, "sending MCP request");

        let mut request = self
            .http
            .post(config.url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_JSON_OR_EVENT_STREAM)
            .bearer_auth(&config.token)
            .json(&envelope);
        if config.has_access_credentials() {
            request = request
                .header(ACCESS_CLIENT_ID_HEADER, config.cf_client_id.as_str())
                .header(ACCESS_CLIENT_SECRET_HEADER, config.cf_client_secret.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::network(describe_send_error(&e)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::network(format!("failed to read response body: {}", describe_send_error(&e))))?;

        if !status.is_success() {
            debug!(target: "strata_backend", id, %status, body = %redact_sensitive(&body), "MCP request rejected");
            return Err(BackendError::transport(status, body));
        }

        decode_body(&body)
    }

    /// Check reachability and credentials by listing the remote tools.
    pub async fn test_connection(&self) -> ConnectionReport {
        let config = self.config();
        debug!(
            target: "strata_backend",
            url = %config.url,
            client_id = %mask_secret(&config.cf_client_id),
            "testing MCP connection"
        );

        match self.rpc_call("tools/list", json!({})).await {
            Ok(RpcResponse { error: Some(error), .. }) => ConnectionReport::failure(error.message),
            Ok(response) => {
                let tool_count = response.tool_entries().map_or(0, Vec::len);
                ConnectionReport::success(format!("Connected! Found {tool_count} tools available."))
            }
            Err(error) => {
                warn!(target: "strata_backend", error = %error, "MCP connection test failed");
                ConnectionReport::failure(format!(
                    "{error}\n\nURL: {}\nCheck: Is the URL reachable from this device?",
                    config.url
                ))
            }
        }
    }

    /// Run the configured workflow with `text` as chat input and return its reply.
    ///
    /// Never fails: errors come back as `"Error: <message>"`.
    pub async fn send_message(&self, text: &str) -> String {
        let config = self.config();
        let params = json!({
            "name": EXECUTE_WORKFLOW_TOOL,
            "arguments": {
                "workflowId": config.workflow_id,
                "inputs": {
                    "type": "chat",
                    "chatInput": text,
                },
            },
        });

        let response = match self.rpc_call("tools/call", params).await {
            Ok(response) => response,
            Err(error) => {
                warn!(target: "strata_backend", error = %error, "workflow execution failed");
                return format!("Error: {error}");
            }
        };

        if let Some(error) = &response.error {
            return format!("Error: {}", error.message);
        }

        match response.first_content_text() {
            Some(result_text) => extract_reply(result_text).unwrap_or_else(|| result_text.to_string()),
            None => NO_RESPONSE.to_string(),
        }
    }

    /// Remote tools as positional descriptors. Empty on any failure.
    pub async fn get_tools(&self) -> Vec<ToolDescriptor> {
        let response = match self.rpc_call("tools/list", json!({})).await {
            Ok(response) => response,
            Err(error) => {
                debug!(target: "strata_backend", error = %error, "tools/list failed");
                return Vec::new();
            }
        };
        if response.error.is_some() {
            return Vec::new();
        }
        let Some(entries) = response.tool_entries() else {
            return Vec::new();
        };

        entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match RemoteTool::deserialize(entry) {
                Ok(tool) => Some(ToolDescriptor {
                    id: format!("tool-{index}"),
                    name: tool.name,
                    description: tool.description.unwrap_or_default(),
                    enabled: true,
                }),
                Err(error) => {
                    debug!(target: "strata_backend", index, error = %error, "skipping unreadable tool entry");
                    None
                }
            })
            .collect()
    }

    /// Workflows visible to the configured token. Empty on any failure.
    pub async fn search_workflows(&self) -> Vec<WorkflowSummary> {
        let params = json!({ "name": SEARCH_WORKFLOWS_TOOL, "arguments": {} });
        let response = match self.rpc_call("tools/call", params).await {
            Ok(response) => response,
            Err(error) => {
                warn!(target: "strata_backend", error = %error, "search workflows failed");
                return Vec::new();
            }
        };

        if let Some(error) = &response.error {
            warn!(target: "strata_backend", code = error.code, message = %error.message, "search workflows error");
            return Vec::new();
        }

        let Some(text) = response.first_content_text() else {
            return Vec::new();
        };
        let page = match serde_json::from_str::<WorkflowPage>(text) {
            Ok(page) => page,
            Err(error) => {
                warn!(target: "strata_backend", error = %error, "failed to parse workflows");
                return Vec::new();
            }
        };

        page.data
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let summary = RemoteWorkflow::deserialize(entry).ok().and_then(RemoteWorkflow::into_summary);
                if summary.is_none() {
                    debug!(target: "strata_backend", index, "skipping unreadable workflow entry");
                }
                summary
            })
            .collect()
    }

    /// Alias of [`Self::search_workflows`].
    pub async fn get_workflows(&self) -> Vec<WorkflowSummary> {
        self.search_workflows().await
    }
}

/// Error text for a failed send, including every underlying cause.
fn describe_send_error(error: &reqwest::Error) -> String {
    let mut message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else {
        error.to_string()
    };
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
