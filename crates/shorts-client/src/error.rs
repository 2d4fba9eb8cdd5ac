//! Service client error types.

use thiserror::Error;

/// Result type for service calls.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur while talking to an external service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Service unavailable ({0}): {1}")]
    Unavailable(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Asset not retrievable: {0}")]
    Retrieval(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            502..=504 => Self::Unavailable(status, message),
            _ => Self::Http { status, message },
        }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn empty_result(msg: impl Into<String>) -> Self {
        Self::EmptyResult(msg.into())
    }

    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status associated with the error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ServiceError::Http { status, .. } => Some(*status),
            ServiceError::Unavailable(status, _) => Some(*status),
            ServiceError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if a user retry has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Network(_)
            | ServiceError::Unavailable(..)
            | ServiceError::Retrieval(_)
            | ServiceError::EmptyResult(_) => true,
            ServiceError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// The service answered but had nothing usable.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ServiceError::EmptyResult(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_status_gateway_errors() {
        let err = ServiceError::from_http_status(503, "down");
        assert!(matches!(err, ServiceError::Unavailable(503, _)));
        assert!(err.is_retryable());
        assert_eq!(err.http_status(), Some(503));
    }

    #[test]
    fn test_from_http_status_client_errors() {
        let err = ServiceError::from_http_status(400, "bad request");
        assert!(matches!(err, ServiceError::Http { status: 400, .. }));
        assert!(!err.is_retryable());

        let err = ServiceError::from_http_status(500, "Failed to generate prompts");
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Failed to generate prompts"));
    }

    #[test]
    fn test_empty_result_flag() {
        assert!(ServiceError::empty_result("no prompts").is_empty_result());
        assert!(!ServiceError::retrieval("missing").is_empty_result());
        assert_eq!(ServiceError::config("bad url").http_status(), None);
    }
}
