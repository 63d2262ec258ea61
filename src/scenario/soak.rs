//! Randomized command sequences that check the simulator's invariants.
//!
//! The generator is seeded, so any violation can be replayed with the seed
//! reported in the error.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::media::MediaTrack;
use crate::player::{Millis, PlaybackSimulator, Repeat, SimEvent, SimState};

use super::error::ScenarioError;
use super::schema::Scenario;

/// Summary of a soak run that found no violation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoakReport {
    pub seed: u64,
    pub operations: u64,
    /// Logical time consumed across all simulators.
    pub advanced: Millis,
    pub ready_reports: u64,
    pub done_reports: u64,
    pub fail_reports: u64,
    /// Simulators rebuilt after they failed.
    pub restarts: u64,
}

#[derive(Debug, Copy, Clone)]
enum Op {
    Advance(Millis),
    Play,
    Pause,
    Rewind,
    Finish,
    Seek(i64),
    ClearRepeat,
}

/// Drive the scenario's track with `operations` random operations.
pub fn soak(scenario: &Scenario, seed: u64, operations: u64) -> Result<SoakReport, ScenarioError> {
    let content = scenario.content.to_content()?;
    let track: &MediaTrack = &scenario.track;
    let fresh = || PlaybackSimulator::from_track(track, &content);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut sim = fresh();
    let mut ready_seen = false;
    let mut report = SoakReport {
        seed,
        ..SoakReport::default()
    };

    // Largest step and seek distance scale with the window so loops get exercised.
    let span = sim
        .end()
        .map(|end| end - sim.start())
        .unwrap_or(2_000)
        .max(1);

    info!("soaking '{}' with seed {seed} for {operations} operations", scenario.title());

    for operation in 0..operations {
        if sim.state() == SimState::Failed && rng.gen_bool(0.2) {
            sim = fresh();
            ready_seen = false;
            report.restarts += 1;
        }

        let op = pick(&mut rng, span);
        let before = sim.clone();
        let violation = |message: String| ScenarioError::Invariant {
            seed,
            operation,
            message,
        };

        match op {
            Op::Advance(max) => {
                let (event, elapsed) = sim.advance_time(max);
                report.advanced += elapsed;

                if elapsed > max {
                    return Err(violation(format!("consumed {elapsed}ms of a {max}ms budget")));
                }
                if before.is_ended() && (event, elapsed) != (SimEvent::NoReport, 0) {
                    return Err(violation(format!(
                        "ended track reported {event} +{elapsed}"
                    )));
                }
                match event {
                    SimEvent::TrackReady => {
                        if ready_seen {
                            return Err(violation("track-ready reported twice".into()));
                        }
                        ready_seen = true;
                        report.ready_reports += 1;
                    }
                    SimEvent::TrackDone => {
                        if sim.state() != SimState::Done || !before.is_active() {
                            return Err(violation("track-done without entering done".into()));
                        }
                        report.done_reports += 1;
                    }
                    SimEvent::TrackFail => {
                        if sim.state() != SimState::Failed || !before.is_active() {
                            return Err(violation("track-fail without entering failed".into()));
                        }
                        report.fail_reports += 1;
                    }
                    SimEvent::TimeUpdate | SimEvent::NoReport => {
                        if before.state() != sim.state() {
                            return Err(violation(format!(
                                "{event} changed state {} -> {}",
                                before.state(),
                                sim.state()
                            )));
                        }
                    }
                }
            }
            Op::Play => {
                sim.play();
            }
            Op::Pause => {
                sim.pause();
            }
            Op::Rewind => {
                sim.rewind();
            }
            Op::Finish => {
                sim.finish();
            }
            Op::Seek(offset) => {
                sim.seek(offset);
            }
            Op::ClearRepeat => {
                sim.clear_repeat();
            }
        }

        if let Err(message) = check_invariants(&before, &sim) {
            debug!("violation after {op:?}: {sim}");
            return Err(violation(message));
        }
        report.operations += 1;
    }

    Ok(report)
}

fn pick(rng: &mut StdRng, span: Millis) -> Op {
    match rng.gen_range(0..100) {
        0..=54 => Op::Advance(rng.gen_range(0..=span / 2 + 1)),
        55..=64 => Op::Play,
        65..=71 => Op::Pause,
        72..=77 => Op::Rewind,
        78..=81 => Op::Finish,
        82..=93 => {
            let reach = i64::try_from(span).unwrap_or(i64::MAX / 2);
            Op::Seek(rng.gen_range(-reach / 4..=reach + reach / 4))
        }
        _ => Op::ClearRepeat,
    }
}

fn check_invariants(before: &PlaybackSimulator, after: &PlaybackSimulator) -> Result<(), String> {
    let position = after.position();
    if position < after.start() {
        return Err(format!("position {position} before start {}", after.start()));
    }
    if let Some(end) = after.end() {
        if position > end {
            return Err(format!("position {position} past end {end}"));
        }
    }
    if let Repeat::Times(n) = after.params().repeat {
        if after.completed_plays() > n {
            return Err(format!(
                "completed {} plays of {n}",
                after.completed_plays()
            ));
        }
    }
    if before.state() == SimState::Failed {
        if after.state() != SimState::Failed {
            return Err(format!("left failed for {}", after.state()));
        }
        if after.position() != before.position()
            || after.completed_plays() != before.completed_plays()
        {
            return Err("failed simulator changed".into());
        }
    }
    Ok(())
}
