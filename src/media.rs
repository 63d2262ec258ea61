//! Track descriptors and the fake content they are played against.
//!
//! A `MediaTrack` is what a document author asked for; `Content` describes
//! what the simulated source actually provides. `playable_window` reconciles
//! the two into the range the play head moves through.

mod model;

pub use model::*;
