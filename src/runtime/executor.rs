//! Exchange runtime executor

use super::ControllerSignal;
use crate::client::{ChatClient, ChatRequest};
use crate::credentials::CredentialStore;
use crate::state_machine::{
    transition, Effect, Event, ExchangeContext, ExchangeState, ReplyOutcome, TransitionError,
};
use crate::transcript::TranscriptStore;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Drives one exchange: applies transitions and executes their effects
pub struct ExchangeRuntime<C, K>
where
    C: ChatClient + ?Sized + 'static,
    K: CredentialStore + ?Sized + 'static,
{
    exchange_id: String,
    context: ExchangeContext,
    state: ExchangeState,
    transcript: Arc<TranscriptStore>,
    client: Arc<C>,
    credentials: Arc<K>,
    signal_tx: broadcast::Sender<ControllerSignal>,
}

impl<C, K> ExchangeRuntime<C, K>
where
    C: ChatClient + ?Sized + 'static,
    K: CredentialStore + ?Sized + 'static,
{
    pub fn new(
        context: ExchangeContext,
        transcript: Arc<TranscriptStore>,
        client: Arc<C>,
        credentials: Arc<K>,
        signal_tx: broadcast::Sender<ControllerSignal>,
    ) -> Self {
        Self {
            exchange_id: uuid::Uuid::new_v4().to_string(),
            context,
            state: ExchangeState::Idle,
            transcript,
            client,
            credentials,
            signal_tx,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Apply one event. Effects that complete immediately are executed here;
    /// the ones that suspend are returned for `run`.
    pub fn dispatch(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let result = transition(&self.state, &self.context, event)?;

        tracing::debug!(
            exchange_id = %self.exchange_id,
            from = self.state.name(),
            to = result.new_state.name(),
            "Exchange transition"
        );
        self.state = result.new_state;

        let mut suspended = Vec::new();
        for effect in result.effects {
            if effect.is_async() {
                suspended.push(effect);
            } else {
                self.apply_local(effect);
            }
        }
        Ok(suspended)
    }

    /// Execute suspended effects until the exchange settles
    pub async fn run(mut self, pending: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = pending.into();

        while let Some(effect) = queue.pop_front() {
            let Some(event) = self.execute_effect(effect).await else {
                continue;
            };

            match self.dispatch(event) {
                Ok(more) => queue.extend(more),
                Err(e) => {
                    tracing::error!(exchange_id = %self.exchange_id, error = %e, "Error handling exchange event");
                    break;
                }
            }
        }

        tracing::debug!(exchange_id = %self.exchange_id, state = self.state.name(), "Exchange finished");
    }

    async fn execute_effect(&self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::RequestReply { message } => {
                let outcome = self.request_reply(message).await;
                Some(Event::ReplyReceived { outcome })
            }
            Effect::ScheduleFinalize { delay } => {
                tokio::time::sleep(delay).await;
                Some(Event::FinalizeDue)
            }
            local => {
                self.apply_local(local);
                None
            }
        }
    }

    fn apply_local(&self, effect: Effect) {
        match effect {
            Effect::AppendEntry { entry } => self.transcript.append(entry),
            Effect::RemoveTyping => self.transcript.remove_typing(),
            Effect::ClearInput => {
                // The UI may already be gone
                let _ = self.signal_tx.send(ControllerSignal::ClearInput);
            }
            Effect::LogFailure { error } => {
                tracing::error!(
                    exchange_id = %self.exchange_id,
                    error = %error,
                    kind = error.kind.as_str(),
                    "Exchange failed"
                );
            }
            suspended @ (Effect::RequestReply { .. } | Effect::ScheduleFinalize { .. }) => {
                tracing::warn!(exchange_id = %self.exchange_id, effect = ?suspended, "Suspending effect skipped");
            }
        }
    }

    async fn request_reply(&self, message: String) -> ReplyOutcome {
        // Read at send time; no validation of presence or shape.
        let credentials = self.credentials.clone();
        let token = tokio::task::spawn_blocking(move || credentials.get())
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(exchange_id = %self.exchange_id, error = %e, "Token read task failed, sending without token");
                None
            });
        let request = ChatRequest::new(token, message);

        tracing::info!(
            exchange_id = %self.exchange_id,
            endpoint = %self.client.endpoint(),
            has_token = request.token.is_some(),
            "Sending chat request"
        );

        match self.client.send(&request).await {
            Ok(response) => match response.response() {
                Some(text) => ReplyOutcome::Reply(text.to_string()),
                None => {
                    tracing::warn!(
                        exchange_id = %self.exchange_id,
                        status = response.status,
                        "Response carried no reply"
                    );
                    ReplyOutcome::MissingReply
                }
            },
            Err(e) => ReplyOutcome::Failed(e),
        }
    }
}
