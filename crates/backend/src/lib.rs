//! Workflow backend client for Strata Voice.
//!
//! This crate talks to an n8n MCP server over JSON-RPC-over-HTTP: it sends
//! chat transcripts to a workflow, unwraps SSE-framed responses, and digs the
//! human-readable reply out of the workflow's execution trace. It also
//! provides the [`BackendProvider`] seam and the [`ConversationSession`] that
//! drives one push-to-talk exchange.

pub mod client;
pub mod error;
pub mod provider;
pub mod rpc;
pub mod session;
pub mod sse;
pub mod trace;

pub use client::{NO_RESPONSE, WorkflowBackendClient};
pub use error::BackendError;
pub use provider::BackendProvider;
pub use rpc::{RpcError, RpcRequest, RpcResponse};
pub use session::ConversationSession;
pub use trace::{ExecutionTrace, extract_reply};
