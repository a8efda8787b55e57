//! Error types for the PipeRun MCP Server.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use thiserror::Error;

/// Errors that can occur while serving a tool call against the PipeRun API.
#[derive(Error, Debug)]
pub enum PipeRunApiError {
    /// A required argument is missing or malformed (detected before any upstream call)
    #[error("Invalid parameter: {0}")]
    InvalidParams(String),

    /// API returned an error status code
    #[error("PipeRun API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Network timeout
    #[error("Request timeout")]
    Timeout,

    /// Failed to parse or build JSON
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic internal error with context
    #[error("Internal error: {0}")]
    Other(String),
}

/// Coarse error classes surfaced through the protocol's error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller supplied bad arguments (or upstream rejected them with 400/422)
    InvalidParams,
    /// Upstream refused the request (401, 403, 404)
    InvalidRequest,
    /// Anything else, including transport faults
    Internal,
}

impl PipeRunApiError {
    /// Shorthand for building an invalid-parameter error.
    pub fn invalid(message: impl Into<String>) -> Self {
        PipeRunApiError::InvalidParams(message.into())
    }

    /// Classify the error for the protocol layer.
    pub fn class(&self) -> ErrorClass {
        match self {
            PipeRunApiError::InvalidParams(_) => ErrorClass::InvalidParams,
            PipeRunApiError::ApiError { status, .. } => match status {
                401 | 403 | 404 => ErrorClass::InvalidRequest,
                400 | 422 => ErrorClass::InvalidParams,
                _ => ErrorClass::Internal,
            },
            _ => ErrorClass::Internal,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Failed to load .env file
    #[error("Failed to load .env file: {0}")]
    DotenvError(String),
}

/// Convenience type alias for Results with PipeRunApiError
pub type PipeRunResult<T> = Result<T, PipeRunApiError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipeRunApiError::invalid("'title' is required");
        assert_eq!(err.to_string(), "Invalid parameter: 'title' is required");

        let err = ConfigError::InvalidValue {
            var: "REQUEST_TIMEOUT".to_string(),
            reason: "Must be a positive number".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for REQUEST_TIMEOUT: Must be a positive number"
        );
    }

    #[test]
    fn test_api_error_folds_status_and_body() {
        let err = PipeRunApiError::ApiError {
            status: 422,
            message: r#"{"message":"stage_id invalid"}"#.to_string(),
        };
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("stage_id invalid"));
    }

    #[test]
    fn test_error_classes() {
        let status = |status| PipeRunApiError::ApiError {
            status,
            message: String::new(),
        };

        assert_eq!(status(401).class(), ErrorClass::InvalidRequest);
        assert_eq!(status(403).class(), ErrorClass::InvalidRequest);
        assert_eq!(status(404).class(), ErrorClass::InvalidRequest);
        assert_eq!(status(400).class(), ErrorClass::InvalidParams);
        assert_eq!(status(422).class(), ErrorClass::InvalidParams);
        assert_eq!(status(500).class(), ErrorClass::Internal);
        assert_eq!(status(429).class(), ErrorClass::Internal);
        assert_eq!(
            PipeRunApiError::invalid("x").class(),
            ErrorClass::InvalidParams
        );
        assert_eq!(PipeRunApiError::Timeout.class(), ErrorClass::Internal);
        assert_eq!(
            PipeRunApiError::HttpError("boom".into()).class(),
            ErrorClass::Internal
        );
    }
}
