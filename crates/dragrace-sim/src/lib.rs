//! Race simulation for the drag race.
//!
//! Owns the per-car physics state, runs the physics, shift, ghost and
//! recorder systems at a fixed tick, and produces `RaceSnapshot`s and a
//! single `RaceResult` per race.

pub mod clock;
pub mod driver;
pub mod engine;
pub mod systems;

pub use dragrace_core as core;
pub use engine::{RaceSession, SessionConfig};

#[cfg(test)]
mod tests;
