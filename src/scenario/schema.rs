use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::media::{Content, MediaTrack};
use crate::player::{Extent, Millis, SimEvent, SimState, TrackState};

use super::error::ScenarioError;

/// A scenario file.
///
/// File format: TOML
///
/// ```toml
/// name = "two passes"
///
/// [track]
/// url = "https://example.com/clip.mp4"
/// duration = 1000
/// repeat_count = 1
///
/// [content]
/// length = 1000
/// initial_delay = 100
/// fail_after = -1
///
/// [[steps]]
/// op = "play"
///
/// [[steps]]
/// op = "run"
/// step = 250
/// budget = 5000
///
/// [[steps]]
/// op = "expect"
/// state = "done"
/// position = 1000
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: Option<String>,
    pub track: MediaTrack,
    pub content: ContentSpec,
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Reject values that would make a step or the content meaningless.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.content.to_content()?;
        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Run { step: 0, .. } => {
                    return Err(ScenarioError::Invalid(format!(
                        "step {index}: run.step must be >= 1"
                    )));
                }
                Step::Advance { times: 0, .. } => {
                    return Err(ScenarioError::Invalid(format!(
                        "step {index}: advance.times must be >= 1"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Name used in reports, falling back to the track url.
    pub fn title(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ if !self.track.url.is_empty() => &self.track.url,
            _ => "untitled",
        }
    }
}

/// Fake content as written in scenario files, with `-1` meaning "unbounded" or "never".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContentSpec {
    /// Actual content length in milliseconds; -1 for live content.
    pub length: i64,
    /// Buffering before playback can start.
    pub initial_delay: Millis,
    /// Milliseconds of playback before the content crashes; -1 never crashes.
    pub fail_after: i64,
}

impl Default for ContentSpec {
    fn default() -> Self {
        Self {
            length: -1,
            initial_delay: 0,
            fail_after: -1,
        }
    }
}

impl ContentSpec {
    pub fn to_content(&self) -> Result<Content, ScenarioError> {
        let length = match self.length {
            -1 => Extent::Unbounded,
            n => Extent::Finite(non_negative("content.length", n)?),
        };
        let fail_after = match self.fail_after {
            -1 => None,
            n => Some(non_negative("content.fail_after", n)?),
        };
        Ok(Content {
            length,
            initial_delay: self.initial_delay,
            fail_after,
        })
    }
}

fn non_negative(field: &str, value: i64) -> Result<Millis, ScenarioError> {
    Millis::try_from(value)
        .map_err(|_| ScenarioError::Invalid(format!("{field} must be -1 or >= 0, got {value}")))
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Step {
    Play,
    Pause,
    Rewind,
    Finish,
    ClearRepeat,
    Seek {
        offset: i64,
    },
    /// Call `advance_time(ms)` a fixed number of times.
    Advance {
        ms: Millis,
        #[serde(default = "default_times")]
        times: u32,
    },
    /// Advance in `step` increments until the track ends or `budget` is spent.
    Run {
        step: Millis,
        budget: Millis,
    },
    Expect(Expectation),
}

fn default_times() -> u32 {
    1
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Play => f.write_str("play"),
            Step::Pause => f.write_str("pause"),
            Step::Rewind => f.write_str("rewind"),
            Step::Finish => f.write_str("finish"),
            Step::ClearRepeat => f.write_str("clear-repeat"),
            Step::Seek { offset } => write!(f, "seek {offset}"),
            Step::Advance { ms, .. } => write!(f, "advance {ms}"),
            Step::Run { step, budget } => write!(f, "run {step}/{budget}"),
            Step::Expect(_) => f.write_str("expect"),
        }
    }
}

/// Checks against the simulator after the previous steps. Unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Expectation {
    pub state: Option<SimState>,
    /// The event reported by the most recent advance.
    pub event: Option<SimEvent>,
    pub track_state: Option<TrackState>,
    pub position: Option<Millis>,
    pub completed_plays: Option<u32>,
    /// Total logical time consumed so far.
    pub clock: Option<Millis>,
}
