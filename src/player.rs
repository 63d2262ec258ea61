//! Deterministic playback simulator.
//!
//! The simulator models one media track moving through buffering, playback,
//! looping and completion or failure. It never reads a clock: the owner feeds
//! it time through `advance_time` and gets back the event that stopped it.

mod simulator;
mod types;

pub use simulator::PlaybackSimulator;
pub use types::*;
