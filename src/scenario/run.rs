use std::fmt;

use log::{debug, info};

use crate::player::{Millis, PlaybackSimulator, SimEvent, SimState};

use super::error::ScenarioError;
use super::schema::{Expectation, Scenario, Step};

/// What a single recorded action produced.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A command, and whether it had an effect.
    Command { acted: bool },
    /// One `advance_time` call.
    Advance { event: SimEvent, elapsed: Millis },
    /// An expectation that held.
    Checked,
}

/// One line of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub step: usize,
    /// Logical clock after the action.
    pub clock: Millis,
    pub label: String,
    pub outcome: Outcome,
    pub position: Millis,
    pub state: SimState,
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>8}ms] #{:<3} {:<16} ", self.clock, self.step, self.label)?;
        match self.outcome {
            Outcome::Command { acted: true } => f.write_str("ok")?,
            Outcome::Command { acted: false } => f.write_str("no effect")?,
            Outcome::Advance { event, elapsed } => write!(f, "{event} +{elapsed}")?,
            Outcome::Checked => f.write_str("passed")?,
        }
        write!(f, " pos={} state={}", self.position, self.state)
    }
}

/// Result of replaying a whole scenario.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Events reported by advances, in order.
    pub fn events(&self) -> Vec<SimEvent> {
        self.entries
            .iter()
            .filter_map(|e| match e.outcome {
                Outcome::Advance { event, .. } => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn clock(&self) -> Millis {
        self.entries.last().map(|e| e.clock).unwrap_or(0)
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Applies scenario steps to a simulator and keeps the logical clock.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    sim: PlaybackSimulator,
    clock: Millis,
    last_event: Option<SimEvent>,
}

impl ScenarioRunner {
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        let content = scenario.content.to_content()?;
        Ok(Self::with_simulator(PlaybackSimulator::from_track(
            &scenario.track,
            &content,
        )))
    }

    pub fn with_simulator(sim: PlaybackSimulator) -> Self {
        Self {
            sim,
            clock: 0,
            last_event: None,
        }
    }

    pub fn simulator(&self) -> &PlaybackSimulator {
        &self.sim
    }

    pub fn clock(&self) -> Millis {
        self.clock
    }

    pub fn last_event(&self) -> Option<SimEvent> {
        self.last_event
    }

    /// Apply `step`, appending what happened to `out`.
    pub fn apply(
        &mut self,
        index: usize,
        step: &Step,
        out: &mut Vec<TranscriptEntry>,
    ) -> Result<(), ScenarioError> {
        let label = step.to_string();
        let acted = match step {
            Step::Play => self.sim.play(),
            Step::Pause => self.sim.pause(),
            Step::Rewind => self.sim.rewind(),
            Step::Finish => self.sim.finish(),
            Step::ClearRepeat => self.sim.clear_repeat(),
            Step::Seek { offset } => self.sim.seek(*offset),
            Step::Advance { ms, times } => {
                for _ in 0..*times {
                    let entry = self.advance(index, &label, *ms);
                    out.push(entry);
                }
                return Ok(());
            }
            Step::Run { step, budget } => {
                self.run(index, &label, *step, *budget, out);
                return Ok(());
            }
            Step::Expect(expectation) => {
                self.check(index, expectation)?;
                out.push(self.entry(index, label, Outcome::Checked));
                return Ok(());
            }
        };

        debug!("step {index}: {label} -> {}", if acted { "ok" } else { "no effect" });
        out.push(self.entry(index, label, Outcome::Command { acted }));
        Ok(())
    }

    fn advance(&mut self, index: usize, label: &str, ms: Millis) -> TranscriptEntry {
        let (event, elapsed) = self.sim.advance_time(ms);
        self.clock += elapsed;
        self.last_event = Some(event);
        if event.is_boundary() {
            debug!("step {index}: {event} at clock {}", self.clock);
        }
        self.entry(index, label.to_string(), Outcome::Advance { event, elapsed })
    }

    fn run(
        &mut self,
        index: usize,
        label: &str,
        step: Millis,
        budget: Millis,
        out: &mut Vec<TranscriptEntry>,
    ) {
        let mut spent: Millis = 0;
        while spent < budget && !self.sim.is_ended() {
            let entry = self.advance(index, label, step.min(budget - spent));
            if let Outcome::Advance { elapsed, .. } = entry.outcome {
                spent += elapsed;
            }
            out.push(entry);
        }
    }

    fn check(&self, index: usize, expect: &Expectation) -> Result<(), ScenarioError> {
        let sim = &self.sim;
        let mut problems: Vec<String> = Vec::new();

        if let Some(state) = expect.state {
            if sim.state() != state {
                problems.push(format!("state is {}, expected {state}", sim.state()));
            }
        }
        if let Some(event) = expect.event {
            if self.last_event != Some(event) {
                let got = self.last_event.map(SimEvent::label).unwrap_or("nothing");
                problems.push(format!("last event is {got}, expected {event}"));
            }
        }
        if let Some(track_state) = expect.track_state {
            if sim.track_state() != track_state {
                problems.push(format!(
                    "track state is {}, expected {track_state}",
                    sim.track_state()
                ));
            }
        }
        if let Some(position) = expect.position {
            if sim.position() != position {
                problems.push(format!(
                    "position is {}, expected {position}",
                    sim.position()
                ));
            }
        }
        if let Some(plays) = expect.completed_plays {
            if sim.completed_plays() != plays {
                problems.push(format!(
                    "completed plays is {}, expected {plays}",
                    sim.completed_plays()
                ));
            }
        }
        if let Some(clock) = expect.clock {
            if self.clock != clock {
                problems.push(format!("clock is {}, expected {clock}", self.clock));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ScenarioError::Expectation {
                step: index,
                message: problems.join("; "),
            })
        }
    }

    fn entry(&self, step: usize, label: String, outcome: Outcome) -> TranscriptEntry {
        TranscriptEntry {
            step,
            clock: self.clock,
            label,
            outcome,
            position: self.sim.position(),
            state: self.sim.state(),
        }
    }
}

/// Replay every step of `scenario` against a fresh simulator.
pub fn run_scenario(scenario: &Scenario) -> Result<Transcript, ScenarioError> {
    let mut runner = ScenarioRunner::new(scenario)?;
    let mut transcript = Transcript::default();

    info!(
        "running scenario '{}' ({} steps)",
        scenario.title(),
        scenario.steps.len()
    );
    for (index, step) in scenario.steps.iter().enumerate() {
        runner.apply(index, step, &mut transcript.entries)?;
    }
    Ok(transcript)
}
