//! Error types for mapgate core.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON5 parse error: {0}")]
    Json5(String),
}

/// Failures raised inside a tool invocation.
///
/// Every variant is converted into a failure envelope before it leaves the
/// tool boundary, so the display text is what callers read.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("No NS_API_KEY provided. Cannot authorize NS API.")]
    MissingCredential,

    /// The remote service answered with a non-success status.
    #[error("{context} failed: {message}")]
    Upstream {
        context: String,
        status: String,
        message: String,
    },

    /// The outbound call could not complete.
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Tool timed out after {limit:?}")]
    Timeout { limit: Duration },
}

impl ToolError {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an upstream error from the remote status and optional message.
    ///
    /// The remote `error_message` wins over the bare status when present.
    pub fn upstream(
        context: impl Into<String>,
        status: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        let status = status.into();
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.clone());
        Self::Upstream {
            context: context.into(),
            status,
            message,
        }
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_prefers_error_message() {
        let err = ToolError::upstream(
            "Geocoding",
            "REQUEST_DENIED",
            Some("The provided API key is invalid.".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "Geocoding failed: The provided API key is invalid."
        );
    }

    #[test]
    fn test_upstream_falls_back_to_status() {
        let err = ToolError::upstream("Elevation request", "ZERO_RESULTS", None);
        assert_eq!(err.to_string(), "Elevation request failed: ZERO_RESULTS");

        let err = ToolError::upstream("Elevation request", "ZERO_RESULTS", Some(String::new()));
        assert_eq!(err.to_string(), "Elevation request failed: ZERO_RESULTS");
    }

    #[test]
    fn test_timeout_message_keeps_unit() {
        let err = ToolError::Timeout {
            limit: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Tool timed out after 30s");

        let err = ToolError::Timeout {
            limit: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Tool timed out after 250ms");
    }

    #[test]
    fn test_missing_credential_message() {
        assert_eq!(
            ToolError::MissingCredential.to_string(),
            "No NS_API_KEY provided. Cannot authorize NS API."
        );
    }
}
