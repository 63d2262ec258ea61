//! Small value types shared by the playback simulator.
//!
//! This module defines the logical time unit, the bounded/unbounded
//! extents used instead of `-1` sentinels, and the state/event enums
//! reported to callers.

use std::fmt;

use serde::Deserialize;

/// Logical milliseconds. No wall clock is ever consulted.
pub type Millis = u64;

/// Length of the playable window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Extent {
    /// A window of this many milliseconds.
    Finite(Millis),
    /// A window with no end (live content).
    Unbounded,
}

impl Extent {
    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    pub fn finite(self) -> Option<Millis> {
        match self {
            Self::Finite(ms) => Some(ms),
            Self::Unbounded => None,
        }
    }
}

/// How many times the playable window is played in total.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Repeat {
    /// Play the window this many times, then finish.
    Times(u32),
    /// Loop forever.
    Forever,
}

impl Repeat {
    /// Whether another pass is allowed after `completed` full passes.
    pub fn allows_another(self, completed: u32) -> bool {
        match self {
            Self::Times(n) => completed < n,
            Self::Forever => true,
        }
    }
}

/// Lifecycle of the simulated track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimState {
    /// Not playing, but buffering still progresses as time passes.
    #[default]
    Idle,
    /// Buffering or playing, looping according to the repeat setting.
    Playing,
    /// Finished every pass. Rewind, seek or clear-repeat can leave it.
    Done,
    /// Crashed. Nothing leaves this state.
    Failed,
}

impl SimState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happened during one call to `advance_time`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimEvent {
    /// The play head moved, or buffering progressed.
    TimeUpdate,
    /// Buffering finished. Reported once per simulator.
    TrackReady,
    /// The last pass reached the end. Unbounded content never reports this on its own.
    TrackDone,
    /// Playback crashed and the simulator is now failed.
    TrackFail,
    /// Nothing observable happened.
    NoReport,
}

impl SimEvent {
    pub fn label(self) -> &'static str {
        match self {
            Self::TimeUpdate => "time-update",
            Self::TrackReady => "track-ready",
            Self::TrackDone => "track-done",
            Self::TrackFail => "track-fail",
            Self::NoReport => "no-report",
        }
    }

    /// True for events that end a call at a boundary.
    pub fn is_boundary(self) -> bool {
        matches!(self, Self::TrackReady | Self::TrackDone | Self::TrackFail)
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Load status as seen by the component consuming the track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackState {
    NotReady,
    Ready,
    Failed,
}

impl TrackState {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotReady => "not-ready",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for TrackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Construction-time parameters. These never change for the life of a simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimParams {
    /// Duration the caller asked for; may differ from the playable window.
    pub requested_duration: Millis,
    pub repeat: Repeat,
    /// Content milliseconds that play successfully before the track crashes.
    pub fail_after: Option<Millis>,
    /// First position of the playable window.
    pub start: Millis,
    pub duration: Extent,
    /// Buffering needed before the first playback.
    pub initial_delay: Millis,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            requested_duration: 0,
            repeat: Repeat::Times(1),
            fail_after: None,
            start: 0,
            duration: Extent::Unbounded,
            initial_delay: 0,
        }
    }
}
