//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::FocusError;
use crate::tui::app::App;

/// Action to take after handling an event.
pub enum Action {
    /// Stop the session and quit.
    Quit,
    /// Stop the running session.
    Stop,
    /// Start another session.
    NewSession,
    /// Open the distraction form.
    NoteDistraction,
}

/// Handle terminal events.
///
/// Returns an action to take, or None if no action is needed.
///
/// # Errors
///
/// Returns an error if event polling fails.
pub fn handle_events(app: &mut App<'_>, timeout: Duration) -> Result<Option<Action>, FocusError> {
    if !event::poll(timeout).map_err(|e| FocusError::Terminal(format!("Event poll failed: {e}")))? {
        return Ok(None);
    }

    let Event::Key(key) =
        event::read().map_err(|e| FocusError::Terminal(format!("Event read failed: {e}")))?
    else {
        return Ok(None);
    };

    if key.kind != KeyEventKind::Press {
        return Ok(None);
    }

    // Handle Ctrl+C
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(Some(Action::Quit));
    }

    if app.form.is_some() {
        handle_form_key(app, key);
        return Ok(None);
    }

    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('s') => Some(Action::Stop),
        KeyCode::Char('n') => Some(Action::NewSession),
        KeyCode::Char('d') => Some(Action::NoteDistraction),
        KeyCode::Char('?') => {
            app.status = Some("d:note distraction | s:stop | n:new session | q:quit".to_string());
            None
        }
        _ => None,
    };

    Ok(action)
}

/// Keys while the distraction form is open.
fn handle_form_key(app: &mut App<'_>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.form.as_mut() {
                form.next_field();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.form.as_mut() {
                form.previous_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.form.as_mut() {
                form.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.form.as_mut() {
                form.push(c);
            }
        }
        _ => {}
    }
}
