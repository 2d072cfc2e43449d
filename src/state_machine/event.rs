//! Events that can occur during an exchange

use crate::client::ChatError;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit { text: String },

    // Remote call events
    ReplyReceived { outcome: ReplyOutcome },

    // Timer events
    FinalizeDue,
}

/// How the remote call ended
#[derive(Debug, Clone)]
pub enum ReplyOutcome {
    /// Body carried a non-empty `response` string
    Reply(String),
    /// Body decoded but had no usable `response` field
    MissingReply,
    /// Transport or decode failure
    Failed(ChatError),
}
