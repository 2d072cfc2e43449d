//! Mock implementations for testing
//!
//! These mocks enable exercising the controller without real I/O.

use super::{ChatController, ControllerSignal};
use crate::client::{ChatClient, ChatError, ChatRequest, ChatResponse};
use crate::credentials::{CredentialStore, MemoryCredentialStore};
use crate::state_machine::ExchangeContext;
use crate::transcript::TranscriptStore;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock Chat Client
// ============================================================================

/// Mock chat client that returns queued responses
pub struct MockChatClient {
    responses: Mutex<VecDeque<Result<ChatResponse, ChatError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: ChatResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: ChatError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<ChatResponse, ChatError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatError::network("No mock response queued")))
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_response()
    }

    fn endpoint(&self) -> &str {
        "mock://chat"
    }
}

// ============================================================================
// Delayed Mock Chat Client (for pending-state testing)
// ============================================================================

/// Mock chat client with a configurable delay per request
pub struct DelayedMockChatClient {
    inner: MockChatClient,
    delays: Mutex<VecDeque<Duration>>,
    default_delay: Duration,
}

impl DelayedMockChatClient {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            inner: MockChatClient::new(),
            delays: Mutex::new(VecDeque::new()),
            default_delay,
        }
    }

    /// Queue a response delivered after a specific delay
    pub fn queue_response_after(&self, delay: Duration, response: ChatResponse) {
        self.delays.lock().unwrap().push_back(delay);
        self.inner.queue_response(response);
    }

    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl ChatClient for DelayedMockChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        // Responses and delays are paired at request start so completion
        // order follows the delays, not the queue.
        let (delay, response) = {
            let delay = self
                .delays
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.default_delay);
            self.inner.requests.lock().unwrap().push(request.clone());
            (delay, self.inner.next_response())
        };
        tokio::time::sleep(delay).await;
        response
    }

    fn endpoint(&self) -> &str {
        "mock://delayed-chat"
    }
}

// ============================================================================
// Test Controller Builder
// ============================================================================

pub fn test_controller<C: ChatClient + 'static>(
    client: Arc<C>,
    reply_delay: Duration,
) -> ChatController<C, MemoryCredentialStore> {
    ChatController::new(
        ExchangeContext::new(reply_delay),
        Arc::new(TranscriptStore::new()),
        client,
        Arc::new(MemoryCredentialStore::new()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatErrorKind;
    use crate::state_machine::transition::{
        FAILED_REPLY_MESSAGE, MISSING_REPLY_MESSAGE, TYPING_PLACEHOLDER,
    };
    use crate::transcript::{ChatEntry, Sender};
    use serde_json::json;

    const FAST: Duration = Duration::from_millis(5);

    fn typing_count(controller: &ChatController<impl ChatClient + 'static, MemoryCredentialStore>) -> usize {
        controller
            .transcript()
            .snapshot()
            .iter()
            .filter(|e| e.sender == Sender::Typing)
            .count()
    }

    #[tokio::test]
    async fn test_mock_chat_client() {
        let mock = MockChatClient::new();
        mock.queue_response(ChatResponse::reply("Hello"));

        let response = mock.send(&ChatRequest::new(None, "hi")).await.unwrap();
        assert_eq!(response.response(), Some("Hello"));

        // Second call should fail (no more responses)
        assert!(mock.send(&ChatRequest::new(None, "hi")).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    /// Reply text is appended verbatim; user text is stored untrimmed
    #[tokio::test]
    async fn test_simple_reply() {
        let client = Arc::new(MockChatClient::new());
        client.queue_response(ChatResponse::reply("hi"));
        let controller = test_controller(client.clone(), FAST);

        let handle = controller.send("  hello ").expect("input accepted");
        handle.await.unwrap();

        assert_eq!(
            controller.transcript().snapshot(),
            vec![ChatEntry::user("  hello "), ChatEntry::bot("hi")]
        );

        let requests = client.recorded_requests();
        assert_eq!(requests, vec![ChatRequest::new(None, "  hello ")]);
        assert_eq!(requests[0].content.user, "user");
    }

    #[tokio::test]
    async fn test_blank_input_is_dropped() {
        let client = Arc::new(MockChatClient::new());
        let controller = test_controller(client.clone(), FAST);
        let mut signals = controller.subscribe_signals();
        let mut changes = controller.transcript().subscribe();

        for text in ["", "   ", "\n\t"] {
            assert!(controller.send(text).is_none());
        }

        assert!(controller.transcript().is_empty());
        assert!(client.recorded_requests().is_empty());
        assert!(signals.try_recv().is_err());
        assert!(changes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_missing_reply_field() {
        let client = Arc::new(MockChatClient::new());
        client.queue_response(ChatResponse::new(200, json!({})));
        let controller = test_controller(client, FAST);

        controller.send("q").unwrap().await.unwrap();

        assert_eq!(
            controller.transcript().snapshot(),
            vec![ChatEntry::user("q"), ChatEntry::bot(MISSING_REPLY_MESSAGE)]
        );
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = Arc::new(MockChatClient::new());
        client.queue_error(ChatError::new(ChatErrorKind::Network, "Connection refused"));
        let controller = test_controller(client, FAST);

        controller.send("q").unwrap().await.unwrap();

        let entries = controller.transcript().snapshot();
        assert_eq!(entries, vec![ChatEntry::user("q"), ChatEntry::bot(FAILED_REPLY_MESSAGE)]);
        assert_ne!(entries[1].text, MISSING_REPLY_MESSAGE);
    }

    /// User entry and typing marker are visible before `send` returns
    #[tokio::test]
    async fn test_typing_marker_while_pending() {
        let client = Arc::new(DelayedMockChatClient::new(Duration::from_millis(100)));
        client.queue_response_after(Duration::from_millis(100), ChatResponse::reply("done"));
        let controller = test_controller(client, FAST);
        let mut signals = controller.subscribe_signals();

        let handle = controller.send("q").unwrap();

        assert_eq!(
            controller.transcript().snapshot(),
            vec![ChatEntry::user("q"), ChatEntry::typing(TYPING_PLACEHOLDER)]
        );
        assert_eq!(signals.try_recv().unwrap(), ControllerSignal::ClearInput);

        handle.await.unwrap();
        assert_eq!(typing_count(&controller), 0);
        assert_eq!(controller.transcript().len(), 2);
    }

    /// The marker stays up for the visible delay even when the reply is instant
    #[tokio::test]
    async fn test_reply_delay_is_respected() {
        let client = Arc::new(MockChatClient::new());
        client.queue_response(ChatResponse::reply("hi"));
        let controller = test_controller(client, Duration::from_millis(300));

        let handle = controller.send("q").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(typing_count(&controller), 1);

        handle.await.unwrap();
        assert_eq!(typing_count(&controller), 0);
        assert_eq!(controller.transcript().snapshot()[1], ChatEntry::bot("hi"));
    }

    #[tokio::test]
    async fn test_token_read_on_every_send() {
        let client = Arc::new(MockChatClient::new());
        client.queue_response(ChatResponse::reply("1"));
        client.queue_response(ChatResponse::reply("2"));
        client.queue_response(ChatResponse::reply("3"));
        let controller = test_controller(client.clone(), FAST);

        controller.send("a").unwrap().await.unwrap();
        controller.credentials().set("abc").unwrap();
        controller.send("b").unwrap().await.unwrap();
        controller.credentials().set("").unwrap();
        controller.send("c").unwrap().await.unwrap();

        let tokens: Vec<_> = client
            .recorded_requests()
            .into_iter()
            .map(|r| r.token)
            .collect();
        assert_eq!(tokens, vec![None, Some("abc".to_string()), Some(String::new())]);
    }

    /// A file-backed token is read off the runtime threads and still reaches the request
    #[tokio::test]
    async fn test_file_token_forwarded() {
        use crate::credentials::FileCredentialStore;

        let dir = tempfile::tempdir().unwrap();
        let credentials = Arc::new(FileCredentialStore::new(dir.path().join("storage.json")));
        credentials.set("abc").unwrap();

        let client = Arc::new(MockChatClient::new());
        client.queue_response(ChatResponse::reply("hi"));
        let controller = ChatController::new(
            ExchangeContext::new(FAST),
            Arc::new(TranscriptStore::new()),
            client.clone(),
            credentials,
        );

        controller.send("q").unwrap().await.unwrap();

        assert_eq!(client.recorded_requests()[0].token.as_deref(), Some("abc"));
        assert_eq!(controller.transcript().snapshot()[1], ChatEntry::bot("hi"));
    }

    /// Overlapping exchanges run side by side; replies land in completion order
    #[tokio::test]
    async fn test_overlapping_sends() {
        let client = Arc::new(DelayedMockChatClient::new(FAST));
        client.queue_response_after(Duration::from_millis(150), ChatResponse::reply("slow"));
        client.queue_response_after(Duration::from_millis(10), ChatResponse::reply("fast"));
        let controller = test_controller(client.clone(), FAST);

        let first = controller.send("one").unwrap();
        let second = controller.send("two").unwrap();

        assert_eq!(typing_count(&controller), 2);

        first.await.unwrap();
        second.await.unwrap();

        let entries = controller.transcript().snapshot();
        let users: Vec<_> = entries.iter().filter(|e| e.sender == Sender::User).map(|e| e.text.as_str()).collect();
        let bots: Vec<_> = entries.iter().filter(|e| e.sender == Sender::Bot).map(|e| e.text.as_str()).collect();
        assert_eq!(users, vec!["one", "two"]);
        assert_eq!(bots, vec!["fast", "slow"]);
        assert_eq!(typing_count(&controller), 0);
        assert_eq!(client.recorded_requests().len(), 2);
    }

    /// Exchanges finish normally after every observer has gone away
    #[tokio::test]
    async fn test_torn_down_observers() {
        let client = Arc::new(MockChatClient::new());
        client.queue_response(ChatResponse::reply("hi"));
        let controller = test_controller(client, FAST);
        drop(controller.subscribe_signals());
        drop(controller.transcript().subscribe());

        controller.send("q").unwrap().await.unwrap();
        assert_eq!(controller.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_observers_see_each_mutation() {
        let client = Arc::new(MockChatClient::new());
        client.queue_response(ChatResponse::reply("hi"));
        let controller = test_controller(client, FAST);
        let mut changes = controller.transcript().subscribe();

        controller.send("q").unwrap().await.unwrap();

        let mut lengths = Vec::new();
        while let Ok(crate::transcript::TranscriptEvent::Changed { entries }) = changes.try_recv() {
            lengths.push(entries.len());
        }
        // user, typing, remove typing, bot
        assert_eq!(lengths, vec![1, 2, 1, 2]);
    }
}
