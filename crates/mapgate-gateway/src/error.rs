//! Gateway error types.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that can occur in the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No live stream for the addressed session.
    #[error("No transport found for sessionId")]
    SessionNotFound(String),

    /// The request named a tool that is not in the catalog.
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// A session id was opened twice.
    #[error("Session already registered: {0}")]
    DuplicateSession(String),

    /// The session limit is reached.
    #[error("Too many open sessions (limit {0})")]
    TooManySessions(usize),

    /// Startup invariant violated, such as two tools sharing a name.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// The request named a method the gateway does not serve.
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// The posted body is not a JSON-RPC message.
    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Get the JSON-RPC error code.
    pub fn code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Json(_) => -32700,
            Self::SessionNotFound(_) => -32001,
            Self::ToolNotFound(_) => -32002,
            _ => -32603,
        }
    }

    /// HTTP status for errors answered directly on an HTTP request.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_)
            | Self::InvalidParams(_)
            | Self::Json(_)
            | Self::MethodNotFound(_) => StatusCode::BAD_REQUEST,
            Self::TooManySessions(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DuplicateSession(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
