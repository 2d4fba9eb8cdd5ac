//! Studio error types.

use shorts_client::ServiceError;
use shorts_models::OrderError;
use thiserror::Error;

pub type StudioResult<T> = Result<T, StudioError>;

/// Errors surfaced to the user by studio operations.
///
/// None of these are fatal: every one leaves the session usable and the
/// failed stage retryable.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(#[source] ServiceError),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Video gate closed: {0}")]
    GateClosed(String),

    #[error("Result superseded: {0}")]
    Superseded(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StudioError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn empty_result(msg: impl Into<String>) -> Self {
        Self::EmptyResult(msg.into())
    }

    pub fn gate_closed(msg: impl Into<String>) -> Self {
        Self::GateClosed(msg.into())
    }

    pub fn superseded(msg: impl Into<String>) -> Self {
        Self::Superseded(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Errors the user fixes by changing input rather than retrying.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, StudioError::Validation(_) | StudioError::GateClosed(_))
    }

    /// Errors where repeating the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StudioError::Upstream(e) => e.is_retryable(),
            StudioError::EmptyResult(_) => true,
            _ => false,
        }
    }
}

impl From<ServiceError> for StudioError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::EmptyResult(msg) => StudioError::EmptyResult(msg),
            ServiceError::Config(msg) => StudioError::Config(msg),
            other => StudioError::Upstream(other),
        }
    }
}

impl From<OrderError> for StudioError {
    fn from(err: OrderError) -> Self {
        StudioError::Validation(format!("invalid display order: {}", err))
    }
}
