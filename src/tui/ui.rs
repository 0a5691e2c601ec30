//! UI rendering for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph},
    Frame,
};

use crate::features::focus::timer::progress;
use crate::features::focus::{format_duration_mmss, TimerMode, TimerPhase};
use crate::tui::app::{App, FORM_LABELS};

const fn phase_color(phase: TimerPhase) -> Color {
    match phase {
        TimerPhase::Idle => Color::DarkGray,
        TimerPhase::Work => Color::Red,
        TimerPhase::Rest => Color::Green,
    }
}

/// Render the application UI.
pub fn render(frame: &mut Frame<'_>, app: &App<'_>) {
    let area = frame.area();

    // Create layout: header, countdown, progress, distractions, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Countdown
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Distractions
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_countdown(frame, app, chunks[1]);
    render_progress(frame, app, chunks[2]);
    render_distractions(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);

    if app.form.is_some() {
        render_form(frame, app, area);
    }
}

/// Render the header.
fn render_header(frame: &mut Frame<'_>, app: &App<'_>, area: Rect) {
    let mode_color = match app.snapshot.mode {
        TimerMode::Pomodoro => Color::Red,
        TimerMode::TimeFreeFocus => Color::Cyan,
    };
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", app.snapshot.mode),
            Style::default().fg(mode_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("· "),
        Span::styled(
            app.snapshot.phase.display_name(),
            Style::default().fg(phase_color(app.snapshot.phase)),
        ),
        Span::styled(
            format!("  ({} sessions this run)", app.completed.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(mode_color)),
    );

    frame.render_widget(header, area);
}

/// Render the remaining time.
fn render_countdown(frame: &mut Frame<'_>, app: &App<'_>, area: Rect) {
    let text = if app.snapshot.phase.is_active() {
        format_duration_mmss(app.snapshot.remaining)
    } else {
        "--:--".to_string()
    };

    let countdown = Paragraph::new(text)
        .alignment(ratatui::layout::Alignment::Center)
        .style(
            Style::default()
                .fg(phase_color(app.snapshot.phase))
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title(" Remaining "));

    frame.render_widget(countdown, area);
}

/// Render the phase progress gauge.
fn render_progress(frame: &mut Frame<'_>, app: &App<'_>, area: Rect) {
    let ratio = if app.snapshot.phase.is_active() {
        progress(app.snapshot.phase_length, app.snapshot.remaining)
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(phase_color(app.snapshot.phase)))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{:.0}%", ratio * 100.0));

    frame.render_widget(gauge, area);
}

/// Render the distractions noted in this session.
fn render_distractions(frame: &mut Frame<'_>, app: &App<'_>, area: Rect) {
    let items: Vec<ListItem<'_>> = app
        .snapshot
        .distractions
        .iter()
        .map(|d| {
            ListItem::new(Line::from(vec![
                Span::styled(&d.cause, Style::default().add_modifier(Modifier::BOLD)),
                Span::styled(
                    format!("  while {}, felt {}", d.activity, d.feeling),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("  → {}", d.alternative),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Distractions ({}) ", app.snapshot.distractions.len())),
    );

    frame.render_widget(list, area);
}

/// Render the distraction form as a centered popup.
fn render_form(frame: &mut Frame<'_>, app: &App<'_>, area: Rect) {
    let Some(form) = &app.form else {
        return;
    };

    let popup = centered(area, 60, 8);
    let lines: Vec<Line<'_>> = FORM_LABELS
        .iter()
        .zip(&form.fields)
        .enumerate()
        .map(|(i, (label, value))| {
            let focused = i == form.focused;
            let style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{label:>12}: "), style),
                Span::raw(value.as_str()),
                Span::raw(if focused { "▏" } else { "" }),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Note distraction "),
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

/// Render the status bar.
fn render_status_bar(frame: &mut Frame<'_>, app: &App<'_>, area: Rect) {
    let status_text = app
        .status
        .as_deref()
        .unwrap_or("d:note distraction | s:stop | n:new session | ?:help | q:quit");

    let status = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));

    frame.render_widget(status, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
