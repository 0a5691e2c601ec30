//! Terminal User Interface (TUI) for tffocus.
//!
//! Full-screen timer view with distraction capture.
//! Built with ratatui and crossterm.

mod app;
mod event;
mod ui;

pub use app::{App, DistractionForm, SessionRequest};

use std::io;
use std::time::Duration;

use crossterm::{
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::error::FocusError;
use crate::features::focus::{DispatchQueue, FocusSessionManager, SessionRecord};

/// How long one frame waits for a key press.
const FRAME_POLL: Duration = Duration::from_millis(100);

/// Run the timer view until the user quits.
///
/// Engine notifications queued on `queue` are drained between frames, so
/// every listener runs on this thread. Returns the sessions sealed while
/// the view was open.
///
/// # Errors
///
/// Returns an error if the TUI fails to initialize or run.
pub fn run(
    manager: &FocusSessionManager,
    queue: &DispatchQueue,
    request: SessionRequest,
    bell: bool,
) -> Result<Vec<SessionRecord>, FocusError> {
    // Setup terminal
    enable_raw_mode().map_err(|e| FocusError::Terminal(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| FocusError::Terminal(format!("Failed to setup terminal: {e}")))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)
        .map_err(|e| FocusError::Terminal(format!("Failed to create terminal: {e}")))?;

    // Create app state and run main loop
    let mut app = App::new(manager, request, bell);
    let result = run_app(&mut terminal, &mut app, queue);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result.map(|()| std::mem::take(&mut app.completed))
}

/// Run the main application loop.
fn run_app<B: Backend + io::Write>(
    terminal: &mut Terminal<B>,
    app: &mut App<'_>,
    queue: &DispatchQueue,
) -> Result<(), FocusError> {
    loop {
        queue.run_pending();
        app.process_events();

        if app.take_bell() {
            execute!(terminal.backend_mut(), Print('\x07')).ok();
        }

        // Draw UI
        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| FocusError::Terminal(format!("Failed to draw: {e}")))?;

        // Handle events
        if let Some(action) = event::handle_events(app, FRAME_POLL)? {
            match action {
                event::Action::Quit => {
                    app.quit();
                    queue.run_pending();
                    app.process_events();
                }
                event::Action::Stop => app.stop(),
                event::Action::NewSession => app.new_session(),
                event::Action::NoteDistraction => app.open_form(),
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
