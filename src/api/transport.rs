use std::fmt;

use async_trait::async_trait;

use super::types::{CourseStats, QueryRequest, QueryResponse};

/// Errors surfaced by a transport call.
///
/// The controller does not distinguish between variants: every one of them
/// ends up as a single error turn (query path) or the failed indicator
/// (stats path). The split exists for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Connection refused, DNS, reset, etc.
    Network(String),
    /// Backend answered with a non-2xx status. The body is not read.
    Status(u16),
    /// Body did not match the expected shape.
    Decode(String),
    /// The task carrying the call went away before producing a result.
    Aborted,
}

impl TransportError {
    /// Short text shown to the user after the `Error: ` prefix.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Status(_) => "Query failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Status(status) => write!(f, "request failed (HTTP {status})"),
            TransportError::Decode(msg) => write!(f, "malformed response: {msg}"),
            TransportError::Aborted => write!(f, "request aborted"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Outbound calls to the question-answering backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `POST /api/query`.
    async fn post_query(&self, request: &QueryRequest) -> Result<QueryResponse, TransportError>;

    /// `GET /api/courses`.
    async fn course_stats(&self) -> Result<CourseStats, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_user_message() {
        assert_eq!(TransportError::Status(500).user_message(), "Query failed");
    }

    #[test]
    fn test_network_error_user_message_keeps_detail() {
        let err = TransportError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), "network error: connection refused");
    }

    #[test]
    fn test_display() {
        assert_eq!(TransportError::Status(404).to_string(), "request failed (HTTP 404)");
        assert_eq!(TransportError::Aborted.to_string(), "request aborted");
    }
}
