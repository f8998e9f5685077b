//! Systems that operate on a car's state each tick.
//!
//! Systems are plain functions over `&mut CarPhysicsState` (or small owned
//! records). They hold no race-wide state; the session owns that.

pub mod ai_shift;
pub mod drivetrain;
pub mod ghost;
pub mod physics;
pub mod recorder;
pub mod shift;
pub mod snapshot;
pub mod traction;
