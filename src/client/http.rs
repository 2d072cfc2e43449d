//! HTTP implementation of the chat endpoint client

use super::types::{ChatRequest, ChatResponse};
use super::{ChatClient, ChatError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Longest slice of an undecodable body kept in the error message
const BODY_PREVIEW_CHARS: usize = 512;

/// Posts chat requests to a fixed endpoint
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
}

impl HttpChatClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ChatError::network(format!("Connection failed: {e}"))
                } else {
                    ChatError::unknown(format!("Request failed: {e}"))
                }
            })?;

        // The status does not decide the outcome; only the body does.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            tracing::debug!(status = %status, "Chat endpoint returned non-success status");
        }

        let value = serde_json::from_str(&body).map_err(|e| {
            ChatError::decode(format!(
                "Failed to parse response: {e} - body: {}",
                body_preview(&body)
            ))
        })?;

        Ok(ChatResponse::new(status.as_u16(), value))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn body_preview(body: &str) -> String {
    let mut chars = body.chars();
    let preview: String = chars.by_ref().take(BODY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}... ({} bytes)", body.len())
    } else {
        preview
    }
}
