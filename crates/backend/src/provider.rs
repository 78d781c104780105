//! Backend provider abstraction.
//!
//! Callers that only need to exchange chat turns (the conversation session,
//! the CLI) depend on [`BackendProvider`] instead of a concrete client, so a
//! provider can be swapped or stubbed without touching them.

use async_trait::async_trait;
use strata_types::{ClientConfig, ConnectionReport, ToolDescriptor};

use crate::client::WorkflowBackendClient;

/// A chat backend reachable over the network.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    /// Provider name for display and logging.
    fn name(&self) -> &'static str;

    /// True when the provider has enough configuration to attempt a call.
    fn is_available(&self) -> bool;

    /// Replace the provider's connection parameters.
    fn configure(&self, config: ClientConfig);

    /// Send one user message and return the reply text. Never fails.
    async fn send_message(&self, text: &str) -> String;

    /// Probe the backend.
    async fn test_connection(&self) -> ConnectionReport;

    /// Tools offered by tool-aware backends.
    async fn get_tools(&self) -> Vec<ToolDescriptor> {
        Vec::new()
    }
}

#[async_trait]
impl BackendProvider for WorkflowBackendClient {
    fn name(&self) -> &'static str {
        WorkflowBackendClient::NAME
    }

    fn is_available(&self) -> bool {
        WorkflowBackendClient::is_available(self)
    }

    fn configure(&self, config: ClientConfig) {
        WorkflowBackendClient::configure(self, config)
    }

    async fn send_message(&self, text: &str) -> String {
        WorkflowBackendClient::send_message(self, text).await
    }

    async fn test_connection(&self) -> ConnectionReport {
        WorkflowBackendClient::test_connection(self).await
    }

    async fn get_tools(&self) -> Vec<ToolDescriptor> {
        WorkflowBackendClient::get_tools(self).await
    }
}
