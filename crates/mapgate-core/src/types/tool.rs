//! Tool-related types.

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discovery metadata for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (unique identifier and dispatch key).
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// JSON Schema describing the accepted arguments.
    pub input_schema: Value,
}

/// One content block of a tool response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text block.
    Text { text: String },
}

/// Response envelope produced for every completed dispatch.
///
/// Success serializes as `{"content":[{"type":"text","text":...}]}`; failure
/// adds `"isError":true` and carries a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Failure marker, omitted on success.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,

    /// Content blocks.
    pub content: Vec<ToolContent>,
}

impl ToolResponse {
    /// Create a success envelope holding a pretty-printed JSON payload.
    pub fn success(payload: &Value) -> Self {
        let text = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
        Self::text(text)
    }

    /// Create a success envelope with raw text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            is_error: false,
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }

    /// Create a failure envelope.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
        }
    }

    /// Text of the first content block.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            ToolContent::Text { text } => text.as_str(),
        })
    }
}

impl From<ToolError> for ToolResponse {
    fn from(err: ToolError) -> Self {
        Self::error(err.to_string())
    }
}

impl From<Result<Value, ToolError>> for ToolResponse {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => Self::success(&payload),
            Err(err) => err.into(),
        }
    }
}
