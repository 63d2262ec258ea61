use super::*;
use crate::config::UiSettings;
use crate::player::{SimEvent, SimState};
use crate::scenario::{Outcome, Scenario, Step};

fn scenario(text: &str) -> Scenario {
    Scenario::parse(text).unwrap()
}

fn looping() -> Scenario {
    scenario(
        r#"
[track]
url = "https://example.com/loop.mp4"
duration = 1000
repeat_count = 1

[content]
length = 1000
initial_delay = 100

[[steps]]
op = "play"

[[steps]]
op = "run"
step = 100
budget = 5000

[[steps]]
op = "expect"
state = "done"
"#,
    )
}

fn app_with(ui: UiSettings) -> App {
    App::new(looping(), &ui).unwrap()
}

fn app() -> App {
    app_with(UiSettings::default())
}

#[test]
fn new_app_starts_idle_with_clock_stopped() {
    let app = app();
    assert_eq!(app.simulator().state(), SimState::Idle);
    assert!(!app.clock_running);
    assert!(app.log.is_empty());
    assert_eq!(app.clock(), 0);
}

#[test]
fn toggle_play_alternates_between_play_and_pause() {
    let mut app = app();
    assert!(app.toggle_play());
    assert!(app.simulator().is_playing());
    assert!(app.toggle_play());
    assert_eq!(app.simulator().state(), SimState::Idle);
    assert_eq!(app.log.len(), 2);
}

#[test]
fn tick_only_advances_while_clock_runs() {
    let mut app = app();
    app.tick(50);
    assert_eq!(app.clock(), 0);

    app.toggle_clock();
    app.tick(50);
    app.tick(50);
    assert_eq!(app.clock(), 100);
    assert_eq!(app.last_event(), Some(SimEvent::TrackReady));
}

#[test]
fn clock_stops_once_the_track_has_ended() {
    let mut app = app();
    app.apply(Step::Finish);
    app.toggle_clock();
    app.tick(50);
    assert!(!app.clock_running);
    assert_eq!(app.clock(), 0);
}

#[test]
fn time_updates_are_only_logged_when_enabled() {
    let mut app = app();
    app.step(50);
    assert!(app.log.is_empty());

    let mut app = app_with(UiSettings {
        log_time_updates: true,
        ..UiSettings::default()
    });
    app.step(50);
    assert_eq!(app.log.len(), 1);
    assert!(matches!(
        app.log[0].outcome,
        Outcome::Advance {
            event: SimEvent::TimeUpdate,
            elapsed: 50
        }
    ));
}

#[test]
fn event_log_is_bounded() {
    let mut app = app_with(UiSettings {
        event_log_len: 3,
        ..UiSettings::default()
    });
    for _ in 0..5 {
        app.toggle_play();
    }
    assert_eq!(app.log.len(), 3);
    assert_eq!(app.log.back().map(|e| e.step), Some(4));
}

#[test]
fn seek_by_moves_relative_to_the_play_head_and_clamps() {
    let mut app = app();
    assert!(app.seek_by(300));
    assert_eq!(app.simulator().position(), 300);
    assert!(app.seek_by(-100));
    assert_eq!(app.simulator().position(), 200);
    assert!(app.seek_by(-5000));
    assert_eq!(app.simulator().position(), 0);
    assert!(!app.seek_by(-10));
}

#[test]
fn run_script_replays_the_scenario_steps() {
    let mut app = app();
    app.run_script();
    assert_eq!(app.simulator().state(), SimState::Done);
    assert_eq!(app.status.as_deref(), Some("script finished (3 steps)"));
}

#[test]
fn failed_expectation_lands_in_status() {
    let mut app = app();
    app.apply(Step::Finish);
    app.apply(Step::Rewind);
    app.apply(Step::Seek { offset: 10 });
    app.apply(Step::Expect(crate::scenario::Expectation {
        state: Some(SimState::Failed),
        ..Default::default()
    }));
    let status = app.status.clone().unwrap();
    assert!(status.contains("expectation failed"));
}

#[test]
fn reset_rebuilds_the_simulator() {
    let mut app = app();
    app.toggle_play();
    app.step(500);
    app.toggle_clock();
    app.reset();
    assert_eq!(app.simulator().state(), SimState::Idle);
    assert_eq!(app.clock(), 0);
    assert!(app.log.is_empty());
    assert!(!app.clock_running);
    assert_eq!(app.last_event(), None);
}
