//! Application module: exposes the model behind the interactive harness.
//!
//! The `App` model lives in `app::model` and holds the simulator being
//! driven, the logical clock and the recent event log.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
