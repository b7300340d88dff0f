//! Error Types
//!
//! Remote store failures, user input rejections and configuration problems.

use std::time::Duration;

use thiserror::Error;

/// Result type for remote store operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Coarse classification shared by every remote store failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Non-success response, or no response at all
    Network,
    /// No response within the request bound
    Timeout,
    /// Response body did not match the house shape
    Protocol,
}

/// Remote store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    Protocol(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Status { .. } | ApiError::Transport(_) => ErrorKind::Network,
            ApiError::Timeout(_) => ErrorKind::Timeout,
            ApiError::Protocol(_) => ErrorKind::Protocol,
        }
    }

    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Rejected add-house input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please fill in the name")]
    MissingName,
    #[error("please fill in the address")]
    MissingAddress,
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key} is not set")]
    Missing { key: &'static str },
    #[error("{key} is not a valid URL: {reason}")]
    InvalidUrl { key: &'static str, reason: String },
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be true or false, got {value:?}")]
    InvalidFlag { key: &'static str, value: String },
}
