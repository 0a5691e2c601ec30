//! Application state for the TUI.

use std::sync::mpsc::{self, Receiver};

use chrono::Duration;

use crate::features::focus::{
    Distraction, FocusEvent, FocusSessionManager, SessionRecord, SubscriptionId, TimerPhase,
    TimerSnapshot,
};

/// What to run when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRequest {
    /// Fixed work and rest lengths
    Pomodoro {
        /// Work length
        work: Duration,
        /// Rest length
        rest: Duration,
    },
    /// Work and rest drawn from the stored bounds
    TimeFreeFocus,
}

/// Labels of the distraction form fields, in order.
pub const FORM_LABELS: [&str; 4] = ["Activity", "Distraction", "Feeling", "Alternative"];

/// Distraction capture form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DistractionForm {
    /// Field contents, indexed like `FORM_LABELS`
    pub fields: [String; 4],
    /// Field with the cursor
    pub focused: usize,
}

impl DistractionForm {
    /// Move to the next field, wrapping.
    pub fn next_field(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len();
    }

    /// Move to the previous field, wrapping.
    pub fn previous_field(&mut self) {
        self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
    }

    /// Type a character into the focused field.
    pub fn push(&mut self, c: char) {
        self.fields[self.focused].push(c);
    }

    /// Delete the last character of the focused field.
    pub fn backspace(&mut self) {
        self.fields[self.focused].pop();
    }

    /// The note as entered.
    #[must_use]
    pub fn to_distraction(&self) -> Distraction {
        let [activity, cause, feeling, alternative] = &self.fields;
        Distraction::new(
            activity.trim(),
            cause.trim(),
            feeling.trim(),
            alternative.trim(),
        )
    }
}

/// Application state.
pub struct App<'a> {
    /// The session engine.
    manager: &'a FocusSessionManager,
    /// What a new session runs.
    request: SessionRequest,
    /// Engine notifications, forwarded by the listener.
    events: Receiver<FocusEvent>,
    /// Listener registration.
    subscription: SubscriptionId,
    /// Latest view of the engine.
    pub snapshot: TimerSnapshot,
    /// Sessions sealed while the app ran.
    pub completed: Vec<SessionRecord>,
    /// Open distraction form, if any.
    pub form: Option<DistractionForm>,
    /// Status message to display.
    pub status: Option<String>,
    /// Whether phase changes ring the terminal bell.
    bell_enabled: bool,
    /// A bell is due on the next frame.
    bell_pending: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl<'a> App<'a> {
    /// Create the app and start the first session.
    pub fn new(manager: &'a FocusSessionManager, request: SessionRequest, bell: bool) -> Self {
        let (tx, events) = mpsc::channel();
        let subscription = manager.subscribe(move |event| {
            // receiver gone means the app is shutting down
            let _ = tx.send(event.clone());
        });

        let mut app = Self {
            manager,
            request,
            events,
            subscription,
            snapshot: manager.snapshot(),
            completed: Vec::new(),
            form: None,
            status: None,
            bell_enabled: bell,
            bell_pending: false,
            should_quit: false,
        };
        app.start_session();
        app
    }

    /// Start a session per the request.
    pub fn start_session(&mut self) {
        match self.request {
            SessionRequest::Pomodoro { work, rest } => {
                self.manager.start_pomodoro(work, rest);
                self.status = Some(format!(
                    "Pomodoro: {} min work, {} min rest",
                    work.num_minutes(),
                    rest.num_minutes()
                ));
            }
            SessionRequest::TimeFreeFocus => {
                let work = self.manager.start_random_tff_work();
                self.status = Some(format!("Time Free Focus: {} min work", work.num_minutes()));
            }
        }
        self.form = None;
        self.process_events();
    }

    /// Drain engine notifications and refresh the snapshot.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                FocusEvent::PhaseChanged {
                    phase: TimerPhase::Rest,
                    remaining,
                } => {
                    self.ring();
                    self.form = None;
                    self.status = Some(format!("Rest for {} min", remaining.num_minutes().max(1)));
                }
                FocusEvent::SessionCompleted(record) => {
                    self.ring();
                    self.form = None;
                    self.status = Some(if record.stopped_manually {
                        "Session stopped. n:new session | q:quit".to_string()
                    } else {
                        "Session complete. n:new session | q:quit".to_string()
                    });
                    self.completed.push(record);
                }
                FocusEvent::PhaseChanged { .. } | FocusEvent::Tick { .. } => {}
            }
        }
        self.snapshot = self.manager.snapshot();
    }

    /// Stop the running session.
    pub fn stop(&mut self) {
        if self.manager.stop().is_none() {
            self.status = Some("No session running".to_string());
        }
        self.process_events();
    }

    /// Start another session once the last one ended.
    pub fn new_session(&mut self) {
        if self.snapshot.phase.is_active() {
            self.status = Some("A session is already running (s to stop)".to_string());
        } else {
            self.start_session();
        }
    }

    /// Stop anything running and quit.
    pub fn quit(&mut self) {
        self.manager.stop();
        self.process_events();
        self.should_quit = true;
    }

    /// Open the distraction form. Only allowed during Work.
    pub fn open_form(&mut self) {
        if self.snapshot.phase == TimerPhase::Work {
            self.form = Some(DistractionForm::default());
            self.status = Some("Tab:next field | Enter:save | Esc:cancel".to_string());
        } else {
            self.status = Some("Distractions can only be noted during work".to_string());
        }
    }

    /// Close the form without saving.
    pub fn cancel_form(&mut self) {
        self.form = None;
        self.status = None;
    }

    /// Save the form as a distraction.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            return;
        };
        let distraction = form.to_distraction();
        if distraction.is_blank() {
            self.status = Some("Empty note discarded".to_string());
        } else if self.manager.add_distraction(distraction) {
            self.status = Some("Distraction noted".to_string());
        } else {
            self.status = Some("Work ended before the note was saved".to_string());
        }
        self.process_events();
    }

    /// Whether a bell is due, clearing it.
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell_pending)
    }

    fn ring(&mut self) {
        if self.bell_enabled {
            self.bell_pending = true;
        }
    }
}

impl Drop for App<'_> {
    fn drop(&mut self) {
        self.manager.unsubscribe(self.subscription);
    }
}
