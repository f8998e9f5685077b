//! Core types and definitions for the drag race simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! car stats and physics state, ghost replays, race results, commands,
//! snapshots, events, and constants. It has no dependency on any runtime.

pub mod commands;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod state;
pub mod types;
