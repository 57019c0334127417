//! Error types for ledgerdesk-client

use thiserror::Error;

/// Failures building the HTTP transport.
///
/// Request-time failures are reported as `ResourceError` through the
/// transport trait instead.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {message}")]
    Build { message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;
