//! Application model: `App` wraps a scenario runner for the terminal UI.
//!
//! Every key press becomes a scenario `Step`, so the interactive harness and
//! the headless runner share one code path into the simulator.

use std::collections::VecDeque;

use log::warn;

use crate::config::UiSettings;
use crate::player::{Millis, PlaybackSimulator, SimEvent};
use crate::scenario::{Outcome, Scenario, ScenarioError, ScenarioRunner, Step, TranscriptEntry};

/// The main application model.
pub struct App {
    pub scenario: Scenario,
    pub scenario_path: Option<String>,
    runner: ScenarioRunner,

    /// Whether logical time advances on every UI tick.
    pub clock_running: bool,
    /// Recent entries, oldest first.
    pub log: VecDeque<TranscriptEntry>,
    log_len: usize,
    log_time_updates: bool,

    /// Steps applied since the last reset; labels log entries.
    applied: usize,
    /// One-line message shown in the status box (errors, script results).
    pub status: Option<String>,
}

impl App {
    /// Create an `App` driving a fresh simulator for `scenario`.
    pub fn new(scenario: Scenario, ui: &UiSettings) -> Result<Self, ScenarioError> {
        let runner = ScenarioRunner::new(&scenario)?;
        Ok(Self {
            scenario,
            scenario_path: None,
            runner,
            clock_running: false,
            log: VecDeque::new(),
            log_len: ui.event_log_len.max(1),
            log_time_updates: ui.log_time_updates,
            applied: 0,
            status: None,
        })
    }

    /// Record where the scenario was loaded from.
    pub fn set_scenario_path(&mut self, path: String) {
        self.scenario_path = Some(path);
    }

    pub fn simulator(&self) -> &PlaybackSimulator {
        self.runner.simulator()
    }

    pub fn clock(&self) -> Millis {
        self.runner.clock()
    }

    pub fn last_event(&self) -> Option<SimEvent> {
        self.runner.last_event()
    }

    /// Apply one step and record it. Returns whether a command had an effect.
    pub fn apply(&mut self, step: Step) -> bool {
        let mut out = Vec::new();
        let index = self.applied;
        self.applied += 1;

        if let Err(e) = self.runner.apply(index, &step, &mut out) {
            self.status = Some(e.to_string());
            return false;
        }

        let acted = out.iter().any(|e| match e.outcome {
            Outcome::Command { acted } => acted,
            Outcome::Advance { .. } | Outcome::Checked => true,
        });
        for entry in out {
            self.record(entry);
        }
        acted
    }

    /// Play when idle, pause when playing.
    pub fn toggle_play(&mut self) -> bool {
        if self.simulator().is_playing() {
            self.apply(Step::Pause)
        } else {
            self.apply(Step::Play)
        }
    }

    /// Move the play head `delta` milliseconds from where it is.
    pub fn seek_by(&mut self, delta: i64) -> bool {
        let sim = self.simulator();
        let from_start = i64::try_from(sim.position() - sim.start()).unwrap_or(i64::MAX);
        self.apply(Step::Seek {
            offset: from_start.saturating_add(delta),
        })
    }

    /// Advance once by `ms`, regardless of the clock toggle.
    pub fn step(&mut self, ms: Millis) {
        self.apply(Step::Advance { ms, times: 1 });
    }

    /// UI tick: advance while the clock runs, and stop it once the track has ended.
    pub fn tick(&mut self, ms: Millis) {
        if !self.clock_running {
            return;
        }
        if self.simulator().is_ended() {
            self.clock_running = false;
            return;
        }
        self.step(ms);
    }

    pub fn toggle_clock(&mut self) {
        self.clock_running = !self.clock_running;
    }

    /// Replay the scenario's scripted steps against the current simulator.
    ///
    /// Stops at the first step that errors, leaving the error in `status`.
    pub fn run_script(&mut self) {
        self.status = None;
        for step in self.scenario.steps.clone() {
            self.apply(step);
            if self.status.is_some() {
                return;
            }
        }
        self.status = Some(format!("script finished ({} steps)", self.scenario.steps.len()));
    }

    /// Throw the simulator away and start over from the scenario.
    pub fn reset(&mut self) {
        match ScenarioRunner::new(&self.scenario) {
            Ok(runner) => {
                self.runner = runner;
                self.log.clear();
                self.applied = 0;
                self.status = None;
                self.clock_running = false;
            }
            Err(e) => {
                // The scenario was valid when the app was built; keep the old simulator.
                warn!("reset failed: {e}");
                self.status = Some(e.to_string());
            }
        }
    }

    fn record(&mut self, entry: TranscriptEntry) {
        let routine = matches!(
            entry.outcome,
            Outcome::Advance {
                event: SimEvent::TimeUpdate | SimEvent::NoReport,
                ..
            }
        );
        if routine && !self.log_time_updates {
            return;
        }
        if self.log.len() == self.log_len {
            self.log.pop_front();
        }
        self.log.push_back(entry);
    }
}
