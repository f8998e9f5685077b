//! Drag race application layer.
//!
//! Runs race sessions on a dedicated loop thread, exposes them through a
//! `RaceHandle`, and keeps the best run on disk as a ghost.

pub mod game_loop;
pub mod handle;
pub mod persistence;
pub mod state;

pub use dragrace_core as core;
