//! Shared type definitions for the Strata Voice workspace.
//!
//! These types carry no behavior beyond small conveniences; they are the
//! vocabulary exchanged between the backend client, the settings store, and
//! the CLI.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection parameters for the workflow backend.
///
/// All fields are plain strings; an empty string means the value is absent.
/// A configuration is never mutated in place: reconfiguring a client replaces
/// the whole value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Endpoint receiving JSON-RPC POST requests.
    pub url: String,
    /// Bearer token sent in the `Authorization` header.
    pub token: String,
    /// Secondary credential id (`CF-Access-Client-Id`).
    pub cf_client_id: String,
    /// Secondary credential secret (`CF-Access-Client-Secret`).
    pub cf_client_secret: String,
    /// Workflow executed by `execute_workflow`.
    pub workflow_id: String,
}

impl ClientConfig {
    /// Build a configuration with only an endpoint and a bearer token.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Attach the secondary credential pair.
    pub fn with_access_credentials(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.cf_client_id = client_id.into();
        self.cf_client_secret = client_secret.into();
        self
    }

    /// Select the workflow to execute.
    pub fn with_workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.workflow_id = workflow_id.into();
        self
    }

    /// True when both halves of the secondary credential pair are set.
    pub fn has_access_credentials(&self) -> bool {
        !self.cf_client_id.is_empty() && !self.cf_client_secret.is_empty()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hidden = |value: &str| if value.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("token", &hidden(&self.token))
            .field("cf_client_id", &hidden(&self.cf_client_id))
            .field("cf_client_secret", &hidden(&self.cf_client_secret))
            .field("workflow_id", &self.workflow_id)
            .finish()
    }
}

/// Flattened view of a remote tool-list entry.
///
/// `id` is positional (`tool-0`, `tool-1`, ...) and is not stable across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

/// A workflow as listed by the remote `search_workflows` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Outcome of a connection test. Never an error; failures carry a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub message: String,
}

impl ConnectionReport {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of a conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Push-to-talk interaction style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PttMode {
    /// Record while the button is held.
    #[default]
    Hold,
    /// Press once to start, again to stop.
    Toggle,
}

impl fmt::Display for PttMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PttMode::Hold => write!(f, "hold"),
            PttMode::Toggle => write!(f, "toggle"),
        }
    }
}

impl FromStr for PttMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hold" => Ok(PttMode::Hold),
            "toggle" => Ok(PttMode::Toggle),
            other => Err(format!("unknown push-to-talk mode '{other}' (expected 'hold' or 'toggle')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn access_credentials_require_both_halves() {
        let config = ClientConfig::new("https://x", "t").with_access_credentials("id", "");
        assert!(!config.has_access_credentials());

        let config = config.with_access_credentials("id", "secret");
        assert!(config.has_access_credentials());
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = ClientConfig::new("https://x", "bearer-value").with_access_credentials("8ddb218662ab.access", "secret-value");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("bearer-value"));
        assert!(!rendered.contains("8ddb218662ab.access"));
        assert!(!rendered.contains("secret-value"));
        assert!(rendered.contains("https://x"));
    }

    #[test]
    fn client_config_deserializes_with_missing_fields() {
        let config: ClientConfig = serde_json::from_value(json!({ "url": "https://x" })).unwrap();
        assert_eq!(config.url, "https://x");
        assert!(config.token.is_empty());
        assert!(config.workflow_id.is_empty());
    }

    #[test]
    fn workflow_summary_omits_absent_description() {
        let summary = WorkflowSummary {
            id: "wf-1".into(),
            name: "Archive".into(),
            description: None,
        };
        assert_eq!(serde_json::to_value(&summary).unwrap(), json!({ "id": "wf-1", "name": "Archive" }));
    }

    #[test]
    fn ptt_mode_parses_case_insensitively() {
        assert_eq!("Toggle".parse::<PttMode>(), Ok(PttMode::Toggle));
        assert_eq!(" hold ".parse::<PttMode>(), Ok(PttMode::Hold));
        assert!("tap".parse::<PttMode>().is_err());
    }
}
