//! Events emitted by the session for audio and UI feedback.

use serde::{Deserialize, Serialize};

use crate::constants::FEEDBACK_DISPLAY_SECS;
use crate::enums::{CarSlot, ShiftGrade};

/// Feedback for a manual upshift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShiftFeedback {
    pub kind: ShiftGrade,
    /// Clock time (seconds) at which the shift was graded.
    pub issued_at: f64,
}

impl ShiftFeedback {
    /// Whether the feedback is still inside its display window at `now`.
    pub fn is_visible_at(&self, now: f64) -> bool {
        now >= self.issued_at && now - self.issued_at < FEEDBACK_DISPLAY_SECS
    }
}

/// Discrete things that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RaceEvent {
    /// Countdown lights stepped down to `remaining`.
    CountdownTick { remaining: u8 },
    /// Lights out: both cars share `start_time`.
    Go { start_time: f64 },
    /// The player shifted.
    Shift(ShiftFeedback),
    /// A car crossed the finish line.
    CarFinished { slot: CarSlot, time: f64 },
    /// Both cars are done.
    RaceFinished { player_won: bool },
}
