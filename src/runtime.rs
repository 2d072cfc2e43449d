//! Runtime for executing exchanges
//!
//! `ChatController::send` runs the synchronous half of an exchange (user
//! entry, typing marker, input reset) before returning, then spawns a task
//! for the remote call and the delayed finalize.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ExchangeRuntime;

use crate::client::ChatClient;
use crate::credentials::CredentialStore;
use crate::state_machine::{Event, ExchangeContext};
use crate::transcript::TranscriptStore;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Side-channel signals for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerSignal {
    /// An input was accepted; reset the text field
    ClearInput,
}

/// Owns the transcript and sequences send/receive cycles.
///
/// Exchanges are not serialized: a second `send` while one is pending runs
/// alongside it, and replies land in completion order.
pub struct ChatController<C = dyn ChatClient, K = dyn CredentialStore>
where
    C: ChatClient + ?Sized + 'static,
    K: CredentialStore + ?Sized + 'static,
{
    context: ExchangeContext,
    transcript: Arc<TranscriptStore>,
    client: Arc<C>,
    credentials: Arc<K>,
    signal_tx: broadcast::Sender<ControllerSignal>,
}

impl<C, K> ChatController<C, K>
where
    C: ChatClient + ?Sized + 'static,
    K: CredentialStore + ?Sized + 'static,
{
    pub fn new(
        context: ExchangeContext,
        transcript: Arc<TranscriptStore>,
        client: Arc<C>,
        credentials: Arc<K>,
    ) -> Self {
        let (signal_tx, _) = broadcast::channel(32);
        Self {
            context,
            transcript,
            client,
            credentials,
            signal_tx,
        }
    }

    /// Submit user input.
    ///
    /// Blank input is dropped and `None` is returned. Otherwise the user entry
    /// and typing marker are already in the transcript when this returns, and
    /// the handle resolves once the bot entry has been appended. Dropping the
    /// handle does not cancel the exchange.
    pub fn send(&self, text: impl Into<String>) -> Option<JoinHandle<()>> {
        let mut exchange = ExchangeRuntime::new(
            self.context.clone(),
            self.transcript.clone(),
            self.client.clone(),
            self.credentials.clone(),
            self.signal_tx.clone(),
        );

        let pending = match exchange.dispatch(Event::Submit { text: text.into() }) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start exchange");
                return None;
            }
        };

        if !exchange.is_pending() {
            tracing::debug!("Ignoring blank input");
            return None;
        }

        Some(tokio::spawn(exchange.run(pending)))
    }

    pub fn transcript(&self) -> &Arc<TranscriptStore> {
        &self.transcript
    }

    pub fn credentials(&self) -> &Arc<K> {
        &self.credentials
    }

    pub fn subscribe_signals(&self) -> broadcast::Receiver<ControllerSignal> {
        self.signal_tx.subscribe()
    }
}
