//! Messages and setup shared between the caller and the race loop thread.

use dragrace_core::commands::PlayerCommand;
use dragrace_core::state::RaceSnapshot;
use dragrace_core::types::{CarStats, GhostReplay, Opponent, RaceResult};

/// Commands sent from the caller to the race loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// A player command to forward to the race session.
    Player(PlayerCommand),
    /// Stop the loop without producing a result.
    Shutdown,
}

/// Messages sent from the race loop thread back to the caller.
#[derive(Debug, Clone)]
pub enum LoopEvent {
    Snapshot(RaceSnapshot),
    /// Sent once, after the settle delay.
    Finished(RaceResult),
    Cancelled,
}

/// Everything needed to start a race on the loop thread.
#[derive(Debug, Clone)]
pub struct RaceSetup {
    pub seed: u64,
    pub player: CarStats,
    pub opponent: Opponent,
    /// Replay to race against instead of the AI.
    pub ghost: Option<GhostReplay>,
    /// Upshift the player automatically at this rpm.
    pub autopilot_rpm: Option<f64>,
}

/// Errors talking to the race loop.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("race loop has stopped")]
    Closed,
    #[error("race loop thread panicked")]
    Panicked,
    #[error("failed to spawn race loop thread: {0}")]
    Spawn(#[from] std::io::Error),
}
