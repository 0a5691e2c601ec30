//! Settings command implementation.

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::config::{Config, Paths};
use crate::error::FocusError;
use crate::features::focus::policy::{DEFAULT_REST, DEFAULT_WORK};
use crate::features::focus::validate::{parse_minutes, MIN_REST_MINUTES, MIN_WORK_MINUTES};
use crate::features::focus::{FocusSessionManager, RestRule, TffBounds};
use crate::output::{format_settings, to_json, SettingsView};

use super::settings_manager;

/// Execute config subcommands.
///
/// # Errors
///
/// Returns `FocusError::Validation` for rejected bounds, or an error if
/// output formatting fails.
pub fn config(
    paths: &Paths,
    config: &Config,
    cmd: ConfigCommands,
    format: OutputFormat,
) -> Result<String, FocusError> {
    let manager = settings_manager(paths);

    match cmd {
        ConfigCommands::Show => format_settings(&settings_view(paths, config, &manager), format),

        ConfigCommands::Tff {
            work_min,
            work_max,
            rest_min,
            rest_max,
        } => {
            let bounds = TffBounds::new(
                parse_minutes(&work_min, "work-min", MIN_WORK_MINUTES)?,
                parse_minutes(&work_max, "work-max", MIN_WORK_MINUTES)?,
                parse_minutes(&rest_min, "rest-min", MIN_REST_MINUTES)?,
                parse_minutes(&rest_max, "rest-max", MIN_REST_MINUTES)?,
            )?;
            manager.configure_tff(bounds);
            updated(&manager, format)
        }

        ConfigCommands::Percent { percent } => {
            let value: u32 = percent.trim().parse().map_err(|_| {
                FocusError::Validation(format!(
                    "rest percent must be a whole number, got '{percent}'"
                ))
            })?;
            manager.configure_rest_percent(value)?;
            updated(&manager, format)
        }

        ConfigCommands::Reset => {
            manager.configure_tff(TffBounds::new(
                DEFAULT_WORK.0,
                DEFAULT_WORK.1,
                DEFAULT_REST.0,
                DEFAULT_REST.1,
            )?);
            updated(&manager, format)
        }
    }
}

fn settings_view(paths: &Paths, config: &Config, manager: &FocusSessionManager) -> SettingsView {
    SettingsView {
        data_dir: paths.root.display().to_string(),
        last_mode: manager.last_mode(),
        tff: manager.policy(),
        pomodoro_work_minutes: config.timer.pomodoro_work_minutes,
        pomodoro_rest_minutes: config.timer.pomodoro_rest_minutes,
        poll_interval_ms: config.timer.poll_interval_ms,
        bell: config.notifications.bell,
    }
}

fn updated(manager: &FocusSessionManager, format: OutputFormat) -> Result<String, FocusError> {
    let policy = manager.policy();
    match format {
        OutputFormat::Json => to_json(&policy),
        OutputFormat::Pretty => {
            let rest = match policy.rest {
                RestRule::Range(range) => range.to_string(),
                RestRule::PercentOfWork(percent) => format!("{percent}% of work"),
            };
            Ok(format!(
                "Time Free Focus updated: work {}, rest {rest}",
                policy.work
            ))
        }
    }
}
