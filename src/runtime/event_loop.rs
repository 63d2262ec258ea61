use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::scenario::Step;
use crate::ui;

/// Main terminal event loop: handles input, UI drawing and the logical clock.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick_every = Duration::from_millis(settings.sim.poll_ms);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app, &settings.sim, &settings.ui, &settings.controls))?;

        let timeout = tick_every.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key_event(key, settings, app) {
                    break;
                }
            }
        }

        // Each wall-clock tick feeds a fixed slice of logical time.
        if last_tick.elapsed() >= tick_every {
            app.tick(settings.sim.tick_ms);
            last_tick = Instant::now();
        }
    }

    Ok(())
}

/// Apply a key press to `app`. Returns `true` when the user asked to quit.
fn handle_key_event(key: KeyEvent, settings: &config::Settings, app: &mut App) -> bool {
    let seek = i64::try_from(settings.controls.seek_step_ms).unwrap_or(i64::MAX);

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            app.toggle_play();
        }
        KeyCode::Char('t') => app.toggle_clock(),
        KeyCode::Char('n') => app.step(settings.sim.step_ms),
        KeyCode::Char('h') | KeyCode::Left => {
            app.seek_by(-seek);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.seek_by(seek);
        }
        KeyCode::Char('r') => {
            app.apply(Step::Rewind);
        }
        KeyCode::Char('f') => {
            app.apply(Step::Finish);
        }
        KeyCode::Char('c') => {
            app.apply(Step::ClearRepeat);
        }
        KeyCode::Char('x') => app.run_script(),
        KeyCode::Char('R') => app.reset(),
        _ => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::SimState;
    use crate::scenario::Scenario;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app(settings: &config::Settings) -> App {
        let scenario = Scenario::parse(
            "[track]\nduration = 3000\n[content]\nlength = 3000\n",
        )
        .unwrap();
        App::new(scenario, &settings.ui).unwrap()
    }

    #[test]
    fn keys_map_to_simulator_commands() {
        let settings = config::Settings::default();
        let mut app = app(&settings);

        assert!(!handle_key_event(press(KeyCode::Char(' ')), &settings, &mut app));
        assert!(app.simulator().is_playing());

        handle_key_event(press(KeyCode::Char('l')), &settings, &mut app);
        assert_eq!(app.simulator().position(), 1000);
        handle_key_event(press(KeyCode::Left), &settings, &mut app);
        assert_eq!(app.simulator().position(), 0);

        handle_key_event(press(KeyCode::Char('n')), &settings, &mut app);
        assert_eq!(app.clock(), 0);
        handle_key_event(press(KeyCode::Char('n')), &settings, &mut app);
        assert_eq!(app.clock(), settings.sim.step_ms);

        handle_key_event(press(KeyCode::Char('f')), &settings, &mut app);
        assert_eq!(app.simulator().state(), SimState::Done);
        handle_key_event(press(KeyCode::Char('r')), &settings, &mut app);
        assert_eq!(app.simulator().state(), SimState::Idle);
    }

    #[test]
    fn quit_keys_end_the_loop() {
        let settings = config::Settings::default();
        let mut app = app(&settings);
        assert!(handle_key_event(press(KeyCode::Char('q')), &settings, &mut app));
        assert!(handle_key_event(press(KeyCode::Esc), &settings, &mut app));
        assert!(handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &settings,
            &mut app
        ));
        assert!(!handle_key_event(press(KeyCode::Char('c')), &settings, &mut app));
    }
}
