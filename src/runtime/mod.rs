use std::env;
use std::path::Path;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::scenario::{Scenario, run_scenario, soak};

mod event_loop;
mod settings;

const USAGE: &str = "\
usage:
  playsim [SCENARIO]                      drive a scenario interactively
  playsim run SCENARIO                    replay a scenario and print its transcript
  playsim soak SCENARIO [SEED] [OPS]      check invariants with random operations
";

/// Scenario used when the interactive harness is started without a file.
const DEMO_SCENARIO: &str = r#"
name = "demo: buffered clip played twice"

[track]
url = "https://example.com/demo.mp4"
duration = 4000
repeat_count = 1

[content]
length = 6000
initial_delay = 750

[[steps]]
op = "play"

[[steps]]
op = "run"
step = 250
budget = 20000

[[steps]]
op = "expect"
state = "done"
completed_plays = 2
"#;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("-h") | Some("--help") => {
            print!("{USAGE}");
            Ok(())
        }
        Some("run") => headless(&args[1..]),
        Some("soak") => soak_command(&settings, &args[1..]),
        path => interactive(&settings, path),
    }
}

fn load_scenario(path: Option<&String>) -> Result<Scenario, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Scenario::load(Path::new(p))?),
        None => Err(format!("missing scenario path\n{USAGE}").into()),
    }
}

fn headless(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = load_scenario(args.first())?;
    let transcript = run_scenario(&scenario)?;
    println!("scenario: {}", scenario.title());
    print!("{transcript}");
    println!("ok: {} entries, clock {}ms", transcript.entries.len(), transcript.clock());
    Ok(())
}

fn soak_command(
    settings: &config::Settings,
    args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = load_scenario(args.first())?;
    let seed = match args.get(1) {
        Some(s) => s.parse::<u64>()?,
        None => settings.soak.seed,
    };
    let operations = match args.get(2) {
        Some(s) => s.parse::<u64>()?,
        None => settings.soak.operations,
    };

    let report = soak(&scenario, seed, operations)?;
    println!(
        "soak ok: seed {} • {} operations • {}ms advanced • ready {} / done {} / fail {} • {} restarts",
        report.seed,
        report.operations,
        report.advanced,
        report.ready_reports,
        report.done_reports,
        report.fail_reports,
        report.restarts
    );
    Ok(())
}

fn interactive(
    settings: &config::Settings,
    path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = match path {
        Some(p) => Scenario::load(Path::new(p))?,
        None => Scenario::parse(DEMO_SCENARIO)?,
    };

    let mut app = App::new(scenario, &settings.ui)?;
    if let Some(p) = path {
        app.set_scenario_path(p.to_string());
    }
    app.clock_running = settings.sim.autostart;

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, settings, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scenario_parses_and_passes() {
        let scenario = Scenario::parse(DEMO_SCENARIO).unwrap();
        let transcript = run_scenario(&scenario).unwrap();
        assert_eq!(transcript.clock(), 750 + 8000);
    }
}
