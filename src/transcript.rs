//! Chat transcript store
//!
//! Ordered log of chat entries. Entries are never edited in place: appending
//! and filtering out typing markers are the only mutations.

use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
    /// Transient marker shown while a reply is pending
    Typing,
}

/// One line of the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub text: String,
    pub sender: Sender,
}

impl ChatEntry {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }

    pub fn typing(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Typing)
    }
}

/// Notification sent to observers after every mutation
#[derive(Debug, Clone)]
pub enum TranscriptEvent {
    Changed { entries: Vec<ChatEntry> },
}

/// Shared, observable transcript
pub struct TranscriptStore {
    entries: RwLock<Vec<ChatEntry>>,
    events_tx: broadcast::Sender<TranscriptEvent>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        let (events_tx, _) = broadcast::channel(128);
        Self {
            entries: RwLock::new(Vec::new()),
            events_tx,
        }
    }

    /// Append one entry at the end. Empty text is accepted as-is.
    pub fn append(&self, entry: ChatEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(entry);
        self.notify(&entries);
    }

    /// Drop every typing marker. Observers are notified even when nothing was removed.
    pub fn remove_typing(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|entry| entry.sender != Sender::Typing);
        let removed = before - entries.len();
        if removed > 1 {
            tracing::debug!(removed, "Removed typing markers from overlapping exchanges");
        }
        self.notify(&entries);
    }

    /// Current entries, oldest first
    pub fn snapshot(&self) -> Vec<ChatEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.events_tx.subscribe()
    }

    /// Called with the write guard held, so notifications go out in mutation order.
    fn notify(&self, entries: &[ChatEntry]) {
        // No receivers means the UI is gone; nothing to re-render.
        let _ = self.events_tx.send(TranscriptEvent::Changed {
            entries: entries.to_vec(),
        });
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}
