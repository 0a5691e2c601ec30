use colored::Colorize;

use super::SettingsView;
use crate::features::focus::timer::format_duration_short;
use crate::features::focus::{format_duration, RestRule, SessionRecord, SessionSummary, TimerMode};

fn mode_label(mode: TimerMode) -> colored::ColoredString {
    match mode {
        TimerMode::Pomodoro => mode.display_name().red(),
        TimerMode::TimeFreeFocus => mode.display_name().cyan(),
    }
}

/// Format session history as a pretty table
pub fn format_history_pretty(records: &[SessionRecord], title: &str) -> String {
    if records.is_empty() {
        return format!("{title} (0 sessions)\n  No sessions");
    }

    let mut output = format!("{} ({} sessions)\n", title, records.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for record in records {
        let icon = if record.stopped_manually {
            "[-]".yellow()
        } else {
            "[x]".green()
        };

        let mut line = format!(
            "{} {}  {}  work {} / rest {}",
            icon,
            record.start_time_local().format("%Y-%m-%d %H:%M").to_string().bold(),
            mode_label(record.mode),
            format_duration_short(record.work_duration),
            format_duration_short(record.rest_duration),
        );

        if !record.distractions.is_empty() {
            line.push_str(&format!(
                "  {}",
                format!("{} distractions", record.distractions.len()).dimmed()
            ));
        }

        output.push_str(&line);
        output.push('\n');
    }

    output
}

/// Format a single session as pretty output
pub fn format_record_pretty(record: &SessionRecord) -> String {
    let outcome = if record.stopped_manually {
        "Stopped".yellow()
    } else {
        "Completed".green()
    };

    let mut output = format!("{} {}\n", outcome, mode_label(record.mode).bold());
    output.push_str(&format!(
        "  {}: {}\n",
        "Started".dimmed(),
        record.start_time_local().format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Ended".dimmed(),
        record.end_time_local().format("%Y-%m-%d %H:%M")
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Work".dimmed(),
        format_duration(record.work_duration)
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Rest".dimmed(),
        format_duration(record.rest_duration)
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Elapsed".dimmed(),
        format_duration(record.elapsed())
    ));

    if !record.distractions.is_empty() {
        output.push_str(&format!("  {}:\n", "Distractions".dimmed()));
        for d in &record.distractions {
            output.push_str(&format!(
                "    - {} ({}; felt {}; instead: {})\n",
                d.cause.bold(),
                d.activity,
                d.feeling,
                d.alternative
            ));
        }
    }

    output
}

/// Format a history summary as pretty output
pub fn format_summary_pretty(summary: &SessionSummary) -> String {
    let mut output = format!("{} ({})\n", "Focus Summary".bold(), summary.period);
    output.push_str(&"─".repeat(40));
    output.push('\n');

    if summary.sessions == 0 {
        output.push_str("  No sessions\n");
        return output;
    }

    output.push_str(&format!("  {}: {}\n", "Sessions".dimmed(), summary.sessions));
    output.push_str(&format!(
        "  {}: {}  {}: {}\n",
        "Completed".dimmed(),
        summary.completed.to_string().green(),
        "Stopped".dimmed(),
        summary.stopped_manually.to_string().yellow()
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Total work".dimmed(),
        format_duration(chrono::Duration::minutes(summary.total_work_minutes))
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Total rest".dimmed(),
        format_duration(chrono::Duration::minutes(summary.total_rest_minutes))
    ));
    output.push_str(&format!(
        "  {}: {:.1} min (longest {} min)\n",
        "Average work".dimmed(),
        summary.avg_work_minutes,
        summary.longest_work_minutes
    ));
    output.push_str(&format!(
        "  {}: {}\n",
        "Distractions".dimmed(),
        summary.distractions
    ));

    if !summary.by_mode.is_empty() {
        output.push_str(&format!("\n  {}\n", "By mode".bold()));
        for totals in &summary.by_mode {
            output.push_str(&format!(
                "    {:<16} {:>3} sessions  {:>5} min\n",
                totals.mode.display_name(),
                totals.sessions,
                totals.work_minutes
            ));
        }
    }

    if !summary.top_causes.is_empty() {
        output.push_str(&format!("\n  {}\n", "Top distractions".bold()));
        for cause in &summary.top_causes {
            output.push_str(&format!("    {:>3}x {}\n", cause.count, cause.cause));
        }
    }

    output
}

/// Format effective settings as pretty output
pub fn format_settings_pretty(view: &SettingsView) -> String {
    let rest = match view.tff.rest {
        RestRule::Range(range) => range.to_string(),
        RestRule::PercentOfWork(percent) => format!("{percent}% of work (min 1 min)"),
    };

    let mut output = format!("{}\n", "Settings".bold());
    output.push_str(&"─".repeat(40));
    output.push('\n');
    output.push_str(&format!("  {}: {}\n", "Data dir".dimmed(), view.data_dir));
    output.push_str(&format!("  {}: {}\n", "Last mode".dimmed(), mode_label(view.last_mode)));
    output.push_str(&format!("\n  {}\n", "Time Free Focus".cyan().bold()));
    output.push_str(&format!("    {}: {}\n", "Work".dimmed(), view.tff.work));
    output.push_str(&format!("    {}: {}\n", "Rest".dimmed(), rest));
    output.push_str(&format!("\n  {}\n", "Pomodoro".red().bold()));
    output.push_str(&format!(
        "    {}: {} min\n",
        "Work".dimmed(),
        view.pomodoro_work_minutes
    ));
    output.push_str(&format!(
        "    {}: {} min\n",
        "Rest".dimmed(),
        view.pomodoro_rest_minutes
    ));
    output.push_str(&format!("\n  {}: {} ms\n", "Poll interval".dimmed(), view.poll_interval_ms));
    output.push_str(&format!(
        "  {}: {}\n",
        "Bell".dimmed(),
        if view.bell { "on" } else { "off" }
    ));

    output
}
