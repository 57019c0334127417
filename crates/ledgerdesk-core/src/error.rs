//! Error types for ledgerdesk-core
//!
//! Every store and controller operation resolves to a value or a
//! categorized `ResourceError`. Categories map onto what the console can
//! offer the user: log in again, retry, or correct the draft.

use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Shown when the server gives no message of its own
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Shown when no bearer credential is available
pub const MISSING_TOKEN_MESSAGE: &str = "Authorization token is missing.";

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or rejected credential
    AuthRequired,
    /// Transport or server failure
    FetchFailed,
    /// A newer fetch was issued before this one resolved
    Superseded,
    /// Draft rejected by the client or the server
    ValidationFailed,
    /// Record not present in the loaded collection
    RecordNotFound,
    /// Resource name not in the catalog
    UnknownResource,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::AuthRequired => write!(f, "AUTH_REQUIRED"),
            ErrorCode::FetchFailed => write!(f, "FETCH_FAILED"),
            ErrorCode::Superseded => write!(f, "SUPERSEDED"),
            ErrorCode::ValidationFailed => write!(f, "VALIDATION_FAILED"),
            ErrorCode::RecordNotFound => write!(f, "RECORD_NOT_FOUND"),
            ErrorCode::UnknownResource => write!(f, "UNKNOWN_RESOURCE"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Detailed error information for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for ledgerdesk-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("Authentication required: {message}")]
    Auth { message: String },

    #[error("Request failed: {message}")]
    Fetch { message: String },

    #[error("Response superseded by a newer request")]
    Superseded,

    #[error("Validation failed: {message}")]
    Validation { message: String, fields: Vec<String> },

    #[error("Record not found: {id}")]
    NotFound { id: String },

    #[error("Unknown resource: {name}")]
    UnknownResource { name: String },
}

impl ResourceError {
    pub fn auth(message: impl Into<String>) -> Self {
        ResourceError::Auth { message: message.into() }
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        ResourceError::Fetch { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ResourceError::Validation { message: message.into(), fields: vec![] }
    }

    /// Client-side rejection naming the empty required fields
    pub fn missing_fields(fields: Vec<String>) -> Self {
        ResourceError::Validation {
            message: format!("Required fields are empty: {}", fields.join(", ")),
            fields,
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            ResourceError::Auth { .. } => ErrorCode::AuthRequired,
            ResourceError::Fetch { .. } => ErrorCode::FetchFailed,
            ResourceError::Superseded => ErrorCode::Superseded,
            ResourceError::Validation { .. } => ErrorCode::ValidationFailed,
            ResourceError::NotFound { .. } => ErrorCode::RecordNotFound,
            ResourceError::UnknownResource { .. } => ErrorCode::UnknownResource,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ResourceError::Auth { .. } => ErrorSeverity::Error,
            ResourceError::Fetch { .. } => ErrorSeverity::Error,
            ResourceError::Superseded => ErrorSeverity::Debug,
            ResourceError::Validation { .. } => ErrorSeverity::Warning,
            ResourceError::NotFound { .. } => ErrorSeverity::Info,
            ResourceError::UnknownResource { .. } => ErrorSeverity::Warning,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ResourceError::Auth { .. })
    }

    /// Text suitable for an inline message or error banner
    pub fn user_message(&self) -> String {
        match self {
            ResourceError::Auth { message }
            | ResourceError::Fetch { message }
            | ResourceError::Validation { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.user_message());

        match self {
            ResourceError::Auth { .. } => {
                details = details.with_suggestion(
                    "Log in again to obtain a fresh token.".to_string()
                );
            }
            ResourceError::Fetch { .. } => {
                details = details.with_suggestion(
                    "Check the connection to the server and retry.".to_string()
                );
            }
            ResourceError::Validation { fields, .. } => {
                if !fields.is_empty() {
                    details = details.with_detail(serde_json::json!({ "fields": fields }));
                }
                details = details.with_suggestion(
                    "Correct the highlighted fields and submit again.".to_string()
                );
            }
            ResourceError::UnknownResource { .. } => {
                details = details.with_suggestion(
                    "Run `ledgerdesk resources` to list the available resources.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with ResourceError
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Resource the operation targets
    pub resource: String,
    /// Record identifier (for record-level operations)
    pub record_id: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str, resource: &str) -> Self {
        Self {
            operation: operation.to_string(),
            resource: resource.to_string(),
            record_id: None,
        }
    }

    /// Add record ID
    pub fn with_record_id(mut self, record_id: String) -> Self {
        self.record_id = Some(record_id);
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &ResourceError, context: &ErrorContext);
    fn log_debug(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &ResourceError, context: &ErrorContext) {
        let message = format!(
            "[{}] {} - Operation: {} - Resource: {} - Record: {:?}",
            error.code(),
            error.user_message(),
            context.operation,
            context.resource,
            context.record_id
        );
        match error.severity() {
            ErrorSeverity::Debug => log::debug!(target: "ledgerdesk::error", "{}", message),
            ErrorSeverity::Info => log::info!(target: "ledgerdesk::error", "{}", message),
            ErrorSeverity::Warning => log::warn!(target: "ledgerdesk::error", "{}", message),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                log::error!(target: "ledgerdesk::error", "{}", message)
            }
        }
    }

    fn log_debug(&self, message: &str, context: &ErrorContext) {
        log::debug!(
            target: "ledgerdesk::store",
            "{} - Operation: {} - Resource: {} - Record: {:?}",
            message,
            context.operation,
            context.resource,
            context.record_id
        );
    }
}

// ==================== Tests ====================
