//! Basic types shared by the store and the controller

use crate::error::{ErrorCode, ResourceError};
use serde::{Deserialize, Serialize};

/// Request status of one resource store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RequestStatus {
    /// Nothing requested yet
    Idle,
    Loading,
    Success,
    Error { code: ErrorCode, message: String },
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::Idle
    }
}

impl RequestStatus {
    pub fn from_error(error: &ResourceError) -> Self {
        RequestStatus::Error {
            code: error.code(),
            message: error.user_message(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RequestStatus::Error { .. })
    }

    /// Error message, when in the error state
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestStatus::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Idle => write!(f, "idle"),
            RequestStatus::Loading => write!(f, "loading"),
            RequestStatus::Success => write!(f, "success"),
            RequestStatus::Error { code, message } => write!(f, "error [{}]: {}", code, message),
        }
    }
}
