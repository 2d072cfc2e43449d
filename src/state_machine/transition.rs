//! Pure state transition function

use super::{Effect, Event, ExchangeContext, ExchangeState, ReplyOutcome};
use crate::transcript::ChatEntry;
use thiserror::Error;

/// Placeholder text of the typing marker
pub const TYPING_PLACEHOLDER: &str = "Bot sedang mengetik...";

/// Bot text when the endpoint answered without a usable `response` field
pub const MISSING_REPLY_MESSAGE: &str = "Maaf, terjadi kesalahan. Mohon coba lagi nanti.";

/// Bot text when the call failed in transport or decoding
pub const FAILED_REPLY_MESSAGE: &str =
    "Maaf, terjadi kesalahan dalam memproses permintaan Anda. Silakan coba lagi nanti.";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ExchangeState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ExchangeState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Exchange already submitted")]
    AlreadySubmitted,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Whitespace-only input, counting the byte order mark as whitespace
fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == '\u{feff}')
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &ExchangeState,
    context: &ExchangeContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Blank input is dropped without touching anything
        (ExchangeState::Idle, Event::Submit { text }) if is_blank(&text) => {
            Ok(TransitionResult::new(ExchangeState::Idle))
        }

        // Idle + Submit -> AwaitingResponse. The untrimmed text is what gets
        // shown and sent.
        (ExchangeState::Idle, Event::Submit { text }) => {
            Ok(TransitionResult::new(ExchangeState::AwaitingResponse {
                message: text.clone(),
            })
            .with_effect(Effect::append(ChatEntry::user(text.clone())))
            .with_effect(Effect::ClearInput)
            .with_effect(Effect::append(ChatEntry::typing(TYPING_PLACEHOLDER)))
            .with_effect(Effect::RequestReply { message: text }))
        }

        (_, Event::Submit { .. }) => Err(TransitionError::AlreadySubmitted),

        // AwaitingResponse + ReplyReceived -> Finalizing, whatever the outcome
        (ExchangeState::AwaitingResponse { .. }, Event::ReplyReceived { outcome }) => {
            let (reply, failure) = match outcome {
                ReplyOutcome::Reply(text) => (text, None),
                ReplyOutcome::MissingReply => (MISSING_REPLY_MESSAGE.to_string(), None),
                ReplyOutcome::Failed(error) => (FAILED_REPLY_MESSAGE.to_string(), Some(error)),
            };

            let mut result = TransitionResult::new(ExchangeState::Finalizing { reply });
            if let Some(error) = failure {
                result = result.with_effect(Effect::LogFailure { error });
            }
            Ok(result.with_effect(Effect::ScheduleFinalize {
                delay: context.reply_delay,
            }))
        }

        // Finalizing + FinalizeDue -> Idle: swap the marker for the bot entry
        (ExchangeState::Finalizing { reply }, Event::FinalizeDue) => {
            Ok(TransitionResult::new(ExchangeState::Idle)
                .with_effect(Effect::RemoveTyping)
                .with_effect(Effect::append(ChatEntry::bot(reply.clone()))))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in state {}",
            state.name()
        ))),
    }
}
