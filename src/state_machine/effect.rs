//! Effects produced by state transitions

use crate::client::ChatError;
use crate::transcript::ChatEntry;
use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Append an entry to the transcript
    AppendEntry { entry: ChatEntry },

    /// Filter typing markers out of the transcript
    RemoveTyping,

    /// Tell the UI to reset its input field
    ClearInput,

    /// Read the token and post the message to the endpoint
    RequestReply { message: String },

    /// Wait before finalizing
    ScheduleFinalize { delay: Duration },

    /// Report a failed remote call to diagnostics
    LogFailure { error: ChatError },
}

impl Effect {
    pub fn append(entry: ChatEntry) -> Self {
        Effect::AppendEntry { entry }
    }

    /// Whether executing this effect suspends the exchange
    pub fn is_async(&self) -> bool {
        matches!(self, Effect::RequestReply { .. } | Effect::ScheduleFinalize { .. })
    }
}
