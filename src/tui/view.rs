//! UI state and key handling, kept free of terminal I/O

use crate::credentials::display_token;
use crate::transcript::ChatEntry;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub const INPUT_PLACEHOLDER: &str = "Ketik pesan Anda di sini...";

/// What the event loop should do in response to a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    /// Hand the raw input buffer to the controller
    Send(String),
    /// Open the credential overlay, or close it if open
    ToggleOverlay,
    /// Store the overlay's input as the new token
    SaveToken(String),
    Quit,
}

/// Credential entry overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialForm {
    pub input: String,
    /// Token as it was when the overlay opened
    pub token_display: String,
}

/// Everything the renderer needs
#[derive(Debug, Default)]
pub struct ChatView {
    pub entries: Vec<ChatEntry>,
    pub input: String,
    pub overlay: Option<CredentialForm>,
}

impl ChatView {
    pub fn new(entries: Vec<ChatEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn overlay_open(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn open_overlay(&mut self, token: Option<&str>) {
        self.overlay = Some(CredentialForm {
            input: String::new(),
            token_display: display_token(token),
        });
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Reset the message field (controller side-channel)
    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<ViewAction> {
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(ViewAction::Quit),
                KeyCode::Char('k') => Some(ViewAction::ToggleOverlay),
                _ => None,
            };
        }

        if let Some(form) = &mut self.overlay {
            return match key.code {
                KeyCode::Esc => {
                    self.overlay = None;
                    None
                }
                KeyCode::Enter => Some(ViewAction::SaveToken(form.input.clone())),
                KeyCode::Backspace => {
                    form.input.pop();
                    None
                }
                KeyCode::Char(c) => {
                    form.input.push(c);
                    None
                }
                _ => None,
            };
        }

        match key.code {
            // Input is cleared by the controller's signal, not here
            KeyCode::Enter => Some(ViewAction::Send(self.input.clone())),
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            _ => None,
        }
    }
}
