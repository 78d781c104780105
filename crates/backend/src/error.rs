//! Error types for backend RPC calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single JSON-RPC round trip.
///
/// Only [`crate::WorkflowBackendClient::rpc_call`] returns this error. The
/// public operations convert it into a report, an `"Error: "` string, or an
/// empty list. A JSON-RPC `error` member in an otherwise valid response is not
/// a `BackendError`; it is returned inside the response.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("MCP request failed: {status} - {body}")]
    Transport { status: StatusCode, body: String },

    #[error("Malformed MCP response: {reason}")]
    MalformedResponse { reason: String },

    #[error("MCP request could not be sent: {message}")]
    Network { message: String },

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl BackendError {
    /// Create a transport error from a non-success HTTP response.
    pub fn transport(status: StatusCode, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse { reason: reason.into() }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    /// HTTP status carried by a transport error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_carries_status_and_body() {
        let err = BackendError::transport(StatusCode::UNAUTHORIZED, "bad token");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(err.to_string(), "MCP request failed: 401 Unauthorized - bad token");
    }

    #[test]
    fn non_transport_errors_have_no_status() {
        let err = BackendError::malformed("No data found in SSE response");
        assert!(matches!(err, BackendError::MalformedResponse { .. }));
        assert_eq!(err.status(), None);

        let err = BackendError::network("connection refused");
        assert!(err.to_string().contains("connection refused"));
    }
}
