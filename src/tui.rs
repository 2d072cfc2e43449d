//! Terminal front end
//!
//! Renders the transcript and forwards key events to the controller. It owns
//! no chat logic: every transcript change arrives as a store notification.

mod view;

pub use view::{ChatView, ViewAction};

use crate::credentials::CredentialStore;
use crate::runtime::{ChatController, ControllerSignal};
use crate::transcript::{ChatEntry, Sender, TranscriptEvent};
use crossterm::event::{self, Event as TermEvent};
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{DefaultTerminal, Frame};
use tokio::sync::{broadcast, mpsc};
use view::INPUT_PLACEHOLDER;

/// Run the UI until the user quits
pub async fn run(controller: &ChatController) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, controller).await;
    ratatui::restore();
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    controller: &ChatController,
) -> std::io::Result<()> {
    let mut view = ChatView::new(controller.transcript().snapshot());
    let mut changes = controller.transcript().subscribe();
    let mut signals = controller.subscribe_signals();
    let mut terminal_events = spawn_terminal_reader();

    loop {
        terminal.draw(|frame| draw(frame, &view))?;

        tokio::select! {
            term_event = terminal_events.recv() => {
                match term_event {
                    Some(TermEvent::Key(key)) => {
                        let action = view.handle_key(key);
                        if !handle_action(&mut view, action, controller) {
                            break;
                        }
                    }
                    // Resize and the rest only need a redraw
                    Some(_) => {}
                    None => break,
                }
            }
            change = changes.recv() => {
                match change {
                    Ok(TranscriptEvent::Changed { entries }) => view.entries = entries,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Transcript notifications lagged, resyncing");
                        view.entries = controller.transcript().snapshot();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            signal = signals.recv() => {
                if let Ok(ControllerSignal::ClearInput) = signal {
                    view.clear_input();
                }
            }
        }
    }

    tracing::info!("UI closed");
    Ok(())
}

/// Returns false when the loop should stop
fn handle_action(
    view: &mut ChatView,
    action: Option<ViewAction>,
    controller: &ChatController,
) -> bool {
    match action {
        Some(ViewAction::Quit) => return false,
        Some(ViewAction::Send(text)) => {
            // Fire and forget; the transcript notifications carry the result
            let _ = controller.send(text);
        }
        Some(ViewAction::ToggleOverlay) => {
            if view.overlay_open() {
                view.close_overlay();
            } else {
                view.open_overlay(controller.credentials().get().as_deref());
            }
        }
        Some(ViewAction::SaveToken(token)) => {
            if let Err(e) = controller.credentials().set(&token) {
                tracing::error!(error = %e, "Failed to store access token");
            }
            view.close_overlay();
        }
        None => {}
    }
    true
}

/// Blocking crossterm reads on a dedicated thread, forwarded to the async loop
fn spawn_terminal_reader() -> mpsc::UnboundedReceiver<TermEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || loop {
        match event::read() {
            Ok(term_event) => {
                if tx.send(term_event).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read terminal event");
                break;
            }
        }
    });
    rx
}

// ============================================================================
// Rendering
// ============================================================================

fn draw(frame: &mut Frame, view: &ChatView) {
    let [header, body, input] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    let title = Paragraph::new(vec![
        Line::from("Chat Bot".bold()),
        Line::from("Powered by Google Gemini".dim()),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, header);

    draw_transcript(frame, body, &view.entries);
    draw_input(frame, input, view);

    if let Some(form) = &view.overlay {
        draw_overlay(frame, form);
    }
}

fn entry_lines(entry: &ChatEntry) -> Vec<Line<'static>> {
    let (style, alignment) = match entry.sender {
        Sender::User => (Style::default().fg(Color::Cyan), Alignment::Right),
        Sender::Bot => (Style::default(), Alignment::Left),
        Sender::Typing => (
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            Alignment::Left,
        ),
    };

    let mut lines: Vec<Line<'static>> = entry
        .text
        .split('\n')
        .map(|line| Line::from(Span::styled(line.to_string(), style)).alignment(alignment))
        .collect();
    lines.push(Line::default());
    lines
}

fn draw_transcript(frame: &mut Frame, area: Rect, entries: &[ChatEntry]) {
    let lines: Vec<Line> = entries.iter().flat_map(entry_lines).collect();

    // Keep the newest entries in view
    let visible = usize::from(area.height);
    let skip = lines.len().saturating_sub(visible);
    let tail: Vec<Line> = lines.into_iter().skip(skip).collect();

    frame.render_widget(Paragraph::new(tail), area);
}

fn draw_input(frame: &mut Frame, area: Rect, view: &ChatView) {
    let block = Block::default().borders(Borders::ALL).title(" Message ");
    let text = if view.input.is_empty() {
        Line::from(INPUT_PLACEHOLDER.dark_gray())
    } else {
        Line::from(view.input.as_str())
    };
    frame.render_widget(Paragraph::new(text).block(block), area);

    if view.overlay.is_none() {
        let offset = u16::try_from(view.input.chars().count()).unwrap_or(u16::MAX);
        frame.set_cursor_position(Position::new(
            area.x.saturating_add(1).saturating_add(offset),
            area.y + 1,
        ));
    }
}

fn draw_overlay(frame: &mut Frame, form: &view::CredentialForm) {
    let [area] = Layout::vertical([Constraint::Length(6)])
        .flex(Flex::Center)
        .areas(frame.area());
    let [area] = Layout::horizontal([Constraint::Percentage(50)])
        .flex(Flex::Center)
        .areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Access token ")
        .title_bottom(" Enter: Submit  Esc: Close ");
    let body = Paragraph::new(vec![
        Line::from(format!("Your token: {}", form.token_display)),
        Line::default(),
        Line::from(vec!["> ".dark_gray(), Span::raw(form.input.clone())]),
    ])
    .block(block);

    frame.render_widget(Clear, area);
    frame.render_widget(body, area);

    let offset = u16::try_from(form.input.chars().count()).unwrap_or(u16::MAX);
    frame.set_cursor_position(Position::new(
        area.x.saturating_add(3).saturating_add(offset),
        area.y + 3,
    ));
}
