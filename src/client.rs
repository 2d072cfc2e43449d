//! Chat endpoint client
//!
//! One request/response per exchange; no streaming, no retries.

mod error;
mod http;
mod types;

pub use error::{ChatError, ChatErrorKind};
pub use http::HttpChatClient;
pub use types::{ChatRequest, ChatResponse};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for the remote chat endpoint
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post one request and decode the JSON body
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;

    /// Endpoint URL, for diagnostics
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: ChatClient + ?Sized> ChatClient for Arc<T> {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        (**self).send(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for chat clients
pub struct LoggingClient {
    inner: Arc<dyn ChatClient>,
}

impl LoggingClient {
    pub fn new(inner: Arc<dyn ChatClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatClient for LoggingClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    status = response.status,
                    has_response = response.response().is_some(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "Chat request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}
