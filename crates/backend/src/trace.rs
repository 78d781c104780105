//! Reply extraction from n8n workflow execution traces.
//!
//! `execute_workflow` answers with a JSON document whose `result.runData`
//! maps node names to their execution records. The human-readable reply is
//! the `output`, `text` or `response` field of the first record's first main
//! output item, taken from the first node (in wire order) that has one.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Output fields checked on each node, in precedence order.
const REPLY_FIELDS: [&str; 3] = ["output", "text", "response"];

#[derive(Debug, Deserialize)]
struct WorkflowExecution {
    #[serde(default)]
    result: Option<ExecutionResult>,
}

#[derive(Debug, Deserialize)]
struct ExecutionResult {
    #[serde(rename = "runData", default)]
    run_data: Option<ExecutionTrace>,
}

/// Node name to execution records, in the order the server sent them.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct ExecutionTrace(IndexMap<String, Value>);

impl ExecutionTrace {
    /// Node names in arrival order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// First reply found across nodes, in arrival order.
    pub fn reply(&self) -> Option<String> {
        self.0.values().find_map(node_reply)
    }
}

/// Extract the reply from the text of an `execute_workflow` result.
///
/// Returns `None` when the text is not JSON, has no `result.runData`, or no
/// node carries a reply field; callers then fall back to the raw text.
pub fn extract_reply(text: &str) -> Option<String> {
    parse_trace(text)?.reply()
}

/// Parse the execution trace out of an `execute_workflow` result text.
pub fn parse_trace(text: &str) -> Option<ExecutionTrace> {
    let execution: WorkflowExecution = serde_json::from_str(text).ok()?;
    execution.result?.run_data
}

/// `node[0].data.main[0][0].json`, then the first present reply field.
fn node_reply(node: &Value) -> Option<String> {
    let json = node.get(0)?.get("data")?.get("main")?.get(0)?.get(0)?.get("json")?;
    REPLY_FIELDS
        .iter()
        .filter_map(|field| json.get(field))
        .find(|value| is_present(value))
        .map(render_reply)
}

/// Null, `false`, zero and the empty string count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render_reply(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
