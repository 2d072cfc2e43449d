//! Gemini Chat - terminal chat client
//!
//! A single-conversation front end for a remote Gemini relay. Each exchange
//! runs through a small state machine whose effects are executed by the
//! runtime; the terminal UI only renders the transcript.

mod client;
mod config;
mod credentials;
mod runtime;
mod state_machine;
mod transcript;
mod tui;

use client::{ChatClient, HttpChatClient, LoggingClient};
use config::ChatConfig;
use credentials::{CredentialStore, FileCredentialStore};
use runtime::ChatController;
use state_machine::ExchangeContext;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use transcript::TranscriptStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ChatConfig::from_env()?;

    // The terminal belongs to the UI, so logs go to a file
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    tracing::info!(
        endpoint = %config.endpoint,
        reply_delay_ms = u64::try_from(config.reply_delay.as_millis()).unwrap_or(u64::MAX),
        "Starting chat client"
    );

    let client: Arc<dyn ChatClient> = Arc::new(LoggingClient::new(Arc::new(
        HttpChatClient::new(&config.endpoint, config.request_timeout)?,
    )));
    let store = FileCredentialStore::new(&config.store_path);
    tracing::info!(path = %store.path().display(), "Using credential store");
    let credentials: Arc<dyn CredentialStore> = Arc::new(store);

    let controller = ChatController::new(
        ExchangeContext::new(config.reply_delay),
        Arc::new(TranscriptStore::new()),
        client,
        credentials,
    );

    tui::run(&controller).await?;

    Ok(())
}
