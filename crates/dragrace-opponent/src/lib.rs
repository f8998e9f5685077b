//! Opponent AI for the drag race.
//!
//! Implements the autonomous shift policy, opponent presets, and the
//! fallback used when flavor text for an opponent cannot be generated.

pub mod flavor;
pub mod policy;
pub mod profiles;

pub use dragrace_core as core;
