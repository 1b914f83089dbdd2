//! Error types for branchboard-core
//!
//! Errors carry a code, a severity and resolution suggestions so the host
//! can log them uniformly and decide on a fallback (usually an empty chart).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use branchboard_config::ConfigError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A report fetch failed
    FetchFailed,
    /// Branch/category directory could not be loaded
    DirectoryUnavailable,
    /// Requested report does not exist
    NotFound,
    /// Response payload did not match the expected shape
    InvalidFormat,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::FetchFailed => write!(f, "FETCH_FAILED"),
            ErrorCode::DirectoryUnavailable => write!(f, "DIRECTORY_UNAVAILABLE"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
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

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

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

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for branchboard-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Report fetch failed{}: {message}", branch_suffix(.branch_id))]
    Fetch {
        branch_id: Option<i64>,
        message: String,
    },

    #[error("Directory unavailable: {message}")]
    Directory { message: String },

    #[error("Report not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

fn branch_suffix(branch_id: &Option<i64>) -> String {
    match branch_id {
        Some(id) => format!(" for branch {}", id),
        None => String::new(),
    }
}

impl CoreError {
    pub fn fetch(branch_id: Option<i64>, message: impl Into<String>) -> Self {
        CoreError::Fetch {
            branch_id,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Fetch { .. } => ErrorCode::FetchFailed,
            CoreError::Directory { .. } => ErrorCode::DirectoryUnavailable,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Fetch { .. } => ErrorSeverity::Error,
            CoreError::Directory { .. } => ErrorSeverity::Warning,
            CoreError::NotFound { .. } => ErrorSeverity::Info,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::ConfigError { .. } => ErrorSeverity::Critical,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Fetch { branch_id, .. } => {
                if let Some(id) = branch_id {
                    details = details.with_detail(serde_json::json!({ "branch_id": id }));
                }
                details = details.with_suggestion(
                    "Check that the reporting API is reachable at the configured api.base_url."
                        .to_string(),
                );
                details = details.with_suggestion(
                    "No partial data is shown; retry once every branch can be fetched.".to_string(),
                );
            }
            CoreError::Directory { .. } => {
                details = details.with_suggestion(
                    "Labels fall back to the configured prefixes until the directory loads."
                        .to_string(),
                );
            }
            CoreError::NotFound { resource } => {
                details = details.with_suggestion(format!(
                    "Check the branch, category and period used for '{}'.",
                    resource
                ));
            }
            CoreError::InvalidFormat { message } => {
                details = details.with_detail(serde_json::json!({ "format_message": message }));
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<ConfigError> for CoreError {
    fn from(error: ConfigError) -> Self {
        CoreError::ConfigError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::InvalidFormat {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Refresh generation the error belongs to
    pub generation: Option<u64>,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            generation: None,
            data: serde_json::json!({}),
        }
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "branchboard::error",
            "ERROR [{}] {} - Operation: {} - Generation: {:?} - Context: {}",
            error.code(),
            error.to_details(),
            context.operation,
            context.generation,
            context.data
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "branchboard::error",
            "WARNING: {} - Operation: {} - Generation: {:?}",
            message,
            context.operation,
            context.generation
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FetchFailed.to_string(), "FETCH_FAILED");
        assert_eq!(ErrorCode::DirectoryUnavailable.to_string(), "DIRECTORY_UNAVAILABLE");
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_fetch_error_message() {
        let error = CoreError::fetch(Some(4), "connection refused");
        assert_eq!(error.to_string(), "Report fetch failed for branch 4: connection refused");
        assert_eq!(error.code(), ErrorCode::FetchFailed);
        assert_eq!(error.severity(), ErrorSeverity::Error);

        let error = CoreError::fetch(None, "timeout");
        assert_eq!(error.to_string(), "Report fetch failed: timeout");
    }

    #[test]
    fn test_fetch_error_details() {
        let details = CoreError::fetch(Some(4), "boom").to_details();
        assert_eq!(details.details, Some(serde_json::json!({ "branch_id": 4 })));
        assert_eq!(details.suggestions.len(), 2);
    }

    #[test]
    fn test_from_config_error() {
        let error: CoreError = ConfigError::InvalidYaml.into();
        assert_eq!(error.code(), ErrorCode::ConfigError);
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("comparison_refresh")
            .with_generation(7)
            .with_data("branches", serde_json::json!([1, 2]));
        assert_eq!(context.operation, "comparison_refresh");
        assert_eq!(context.generation, Some(7));
        assert_eq!(context.data["branches"], serde_json::json!([1, 2]));
    }
}
