//! Timer session commands.
//!
//! Validates lengths, then hands the terminal to the timer view.

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use super::{settings_manager, stores};
use crate::cli::args::OutputFormat;
use crate::config::{Config, Paths};
use crate::error::FocusError;
use crate::features::focus::validate::{
    check_minutes, parse_minutes, MIN_REST_MINUTES, MIN_WORK_MINUTES,
};
use crate::features::focus::{ChannelDispatcher, FocusSessionManager, TimerMode};
use crate::output::format_history;
use crate::tui::{self, SessionRequest};

/// Execute the pomodoro command.
///
/// # Errors
///
/// Returns `FocusError::Validation` for invalid lengths, or an error if
/// the timer view fails.
pub fn pomodoro(
    paths: &Paths,
    config: &Config,
    work: Option<&str>,
    rest: Option<&str>,
    format: OutputFormat,
) -> Result<String, FocusError> {
    let request = pomodoro_request(config, work, rest)?;
    run_session(paths, config, request, TimerMode::Pomodoro, format)
}

/// Execute the tff command.
///
/// # Errors
///
/// Returns an error if the timer view fails.
pub fn tff(paths: &Paths, config: &Config, format: OutputFormat) -> Result<String, FocusError> {
    run_session(
        paths,
        config,
        SessionRequest::TimeFreeFocus,
        TimerMode::TimeFreeFocus,
        format,
    )
}

/// Execute the start command: run the mode used last.
///
/// # Errors
///
/// Returns `FocusError::Validation` if configured Pomodoro lengths are
/// invalid, or an error if the timer view fails.
pub fn start(paths: &Paths, config: &Config, format: OutputFormat) -> Result<String, FocusError> {
    match settings_manager(paths).last_mode() {
        TimerMode::Pomodoro => pomodoro(paths, config, None, None, format),
        TimerMode::TimeFreeFocus => tff(paths, config, format),
    }
}

/// Resolve Pomodoro lengths from flags, falling back to config.
fn pomodoro_request(
    config: &Config,
    work: Option<&str>,
    rest: Option<&str>,
) -> Result<SessionRequest, FocusError> {
    let work = match work {
        Some(text) => parse_minutes(text, "work", MIN_WORK_MINUTES)?,
        None => check_minutes(
            config.timer.pomodoro_work_minutes,
            "timer.pomodoro_work_minutes",
            MIN_WORK_MINUTES,
        )?,
    };
    let rest = match rest {
        Some(text) => parse_minutes(text, "rest", MIN_REST_MINUTES)?,
        None => check_minutes(
            config.timer.pomodoro_rest_minutes,
            "timer.pomodoro_rest_minutes",
            MIN_REST_MINUTES,
        )?,
    };

    Ok(SessionRequest::Pomodoro {
        work: Duration::minutes(i64::from(work)),
        rest: Duration::minutes(i64::from(rest)),
    })
}

fn run_session(
    paths: &Paths,
    config: &Config,
    request: SessionRequest,
    mode: TimerMode,
    format: OutputFormat,
) -> Result<String, FocusError> {
    paths.ensure_dirs()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("tffocus-timer")
        .enable_time()
        .build()?;

    let (dispatcher, queue) = ChannelDispatcher::for_current_thread();
    let (log, settings) = stores(paths);
    let manager = FocusSessionManager::builder(log, settings)
        .dispatcher(Arc::new(dispatcher))
        .runtime(Some(runtime.handle().clone()))
        .poll_interval(config.timer.poll_interval())
        .pomodoro_rest(Duration::minutes(i64::from(
            config.timer.pomodoro_rest_minutes,
        )))
        .build();
    manager.set_last_mode(mode);

    info!(%mode, "opening timer view");
    let records = tui::run(&manager, &queue, request, config.notifications.bell)?;
    runtime.shutdown_background();
    for record in &records {
        info!(session = %record.format_summary(), "recorded");
    }

    format_history(&records, "This run", format)
}
