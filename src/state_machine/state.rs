//! Exchange state types

use std::time::Duration;

/// State of a single exchange
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExchangeState {
    /// Nothing submitted yet, or the exchange has settled
    #[default]
    Idle,

    /// User entry and typing marker are shown; remote call in flight
    AwaitingResponse {
        /// Untrimmed text as submitted
        message: String,
    },

    /// Outcome known; waiting out the visible delay before swapping the
    /// typing marker for the bot entry
    Finalizing {
        /// Bot text to append once the delay elapses
        reply: String,
    },
}

impl ExchangeState {
    /// Check if the exchange has a reply outstanding
    pub fn is_pending(&self) -> bool {
        !matches!(self, ExchangeState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExchangeState::Idle => "idle",
            ExchangeState::AwaitingResponse { .. } => "awaiting_response",
            ExchangeState::Finalizing { .. } => "finalizing",
        }
    }
}

/// Immutable configuration shared by every exchange
#[derive(Debug, Clone)]
pub struct ExchangeContext {
    /// Minimum time the typing marker stays visible after the call returns
    pub reply_delay: Duration,
}

impl ExchangeContext {
    pub fn new(reply_delay: Duration) -> Self {
        Self { reply_delay }
    }
}
