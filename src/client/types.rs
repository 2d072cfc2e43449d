//! Wire types for the chat endpoint

use serde::Serialize;
use serde_json::Value;

/// Value sent in `content.user`. The endpoint expects this literal regardless
/// of who is speaking.
pub const CONTENT_USER: &str = "user";

/// Outbound request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Sent as `null` when no token has been stored
    pub token: Option<String>,
    pub content: ChatContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatContent {
    pub user: String,
    pub message: String,
}

impl ChatRequest {
    pub fn new(token: Option<String>, message: impl Into<String>) -> Self {
        Self {
            token,
            content: ChatContent {
                user: CONTENT_USER.to_string(),
                message: message.into(),
            },
        }
    }
}

/// Decoded response body
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub status: u16,
    pub body: Value,
}

impl ChatResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Build a 200 response carrying `{"response": text}`
    #[cfg(test)]
    pub fn reply(text: impl Into<String>) -> Self {
        Self::new(200, serde_json::json!({ "response": text.into() }))
    }

    /// The reply text, if the body carries a non-empty string `response` field.
    /// Any other shape counts as no reply.
    pub fn response(&self) -> Option<&str> {
        self.body
            .get("response")
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }
}
