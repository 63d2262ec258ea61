//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::App;
use crate::config::{ControlsSettings, SimSettings, TimeField, UiSettings};
use crate::player::{Extent, Millis, Repeat, SimState};

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("t".to_string(), "clock on/off".to_string());
    // n and h/l are filled dynamically from config.
    map.insert("r".to_string(), "rewind".to_string());
    map.insert("f".to_string(), "finish".to_string());
    map.insert("c".to_string(), "clear repeat".to_string());
    map.insert("x".to_string(), "run script".to_string());
    map.insert("R".to_string(), "reset".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating step and seek sizes.
fn controls_text(step_ms: u64, seek_step_ms: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = ["space/p", "t", "n", "h/l", "r", "f", "c", "x", "R", "q"];
    order
        .iter()
        .filter_map(|k| match *k {
            "n" => Some(format!("[n] step +{}ms", step_ms)),
            "h/l" => Some(format!("[h/l] seek -/+{}ms", seek_step_ms)),
            _ => CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)),
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format logical milliseconds as `MM:SS.mmm`.
pub(crate) fn format_ms(ms: Millis) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}.{:03}", secs / 60, secs % 60, ms % 1000)
}

/// Build the time text (position/window/remaining/clock) per `UiSettings`.
fn time_text(app: &App, ui: &UiSettings) -> Option<String> {
    if ui.time_fields.is_empty() {
        return None;
    }

    let sim = app.simulator();
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.time_fields {
        match f {
            TimeField::Position => parts.push(format!("at {}", format_ms(sim.position()))),
            TimeField::Window => match sim.end() {
                Some(end) => parts.push(format!(
                    "window {}-{}",
                    format_ms(sim.start()),
                    format_ms(end)
                )),
                None => parts.push(format!("window {}-live", format_ms(sim.start()))),
            },
            TimeField::Remaining => {
                if let Some(end) = sim.end() {
                    let rem = end.saturating_sub(sim.position());
                    parts.push(format!("-{}", format_ms(rem)));
                }
            }
            TimeField::Clock => parts.push(format!("clock {}", format_ms(app.clock()))),
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.time_separator))
    }
}

/// Fraction of the current pass already played; unbounded content shows an empty bar.
fn progress_ratio(app: &App) -> f64 {
    let sim = app.simulator();
    match sim.params().duration {
        Extent::Finite(0) | Extent::Unbounded => 0.0,
        Extent::Finite(window) => {
            let played = sim.position().saturating_sub(sim.start());
            (played as f64 / window as f64).clamp(0.0, 1.0)
        }
    }
}

fn plays_text(app: &App) -> String {
    let sim = app.simulator();
    match sim.params().repeat {
        Repeat::Times(n) => format!("PLAYS: {}/{}", sim.completed_plays(), n),
        Repeat::Forever => format!("PLAYS: {}/∞", sim.completed_plays()),
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    sim_settings: &SimSettings,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" playsim ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let sim = app.simulator();
    let status = {
        let mut parts: Vec<String> = Vec::new();

        parts.push(format!(" STATE: {}", sim.state()));
        parts.push(format!("TRACK: {}", sim.track_state()));
        parts.push(plays_text(app));
        if sim.duration() > 0 {
            parts.push(format!("REQUESTED: {}ms", sim.duration()));
        }
        if sim.buffering_remaining() > 0 {
            parts.push(format!("BUFFERING: {}ms", sim.buffering_remaining()));
        }
        if let Some(time) = time_text(app, ui_settings) {
            parts.push(time);
        }
        if let Some(event) = app.last_event() {
            parts.push(format!("LAST: {}", event));
        }
        if app.clock_running {
            parts.push(format!("CLOCK: running +{}ms/tick", sim_settings.tick_ms));
        } else {
            parts.push("CLOCK: stopped".to_string());
        }
        parts.push(format!("Scenario: {}", app.scenario.title()));
        if let Some(path) = &app.scenario_path {
            parts.push(format!("File: {}", path));
        }
        if let Some(msg) = &app.status {
            parts.push(msg.clone());
        }

        parts.join(" • ")
    };

    let mut status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    if sim.state() == SimState::Failed {
        status_par = status_par.slow_blink();
    }
    frame.render_widget(status_par, chunks[1]);

    // Play head
    let label = match sim.end() {
        Some(end) => format!("{} / {}", format_ms(sim.position()), format_ms(end)),
        None => format!("{} / live", format_ms(sim.position())),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" play head "))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(progress_ratio(app))
        .label(label);
    frame.render_widget(gauge, chunks[2]);

    // Event log: newest entries at the bottom, trimmed to what fits.
    {
        let height = chunks[3].height.saturating_sub(2) as usize;
        let skip = app.log.len().saturating_sub(height);
        let items: Vec<ListItem> = app
            .log
            .iter()
            .skip(skip)
            .map(|entry| ListItem::new(entry.to_string()))
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" events "));
        frame.render_widget(list, chunks[3]);
    }

    let footer_text = controls_text(sim_settings.step_ms, controls_settings.seek_step_ms);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}
