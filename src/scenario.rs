//! Scripted scenarios for the playback simulator.
//!
//! A scenario is a TOML file describing a track, the fake content behind it
//! and a list of steps (commands, time advances and expectations). Scenarios
//! can be replayed into a transcript or fed to the randomized soak checker.

mod error;
mod run;
mod schema;
mod soak;

pub use error::ScenarioError;
pub use run::*;
pub use schema::*;
pub use soak::*;
