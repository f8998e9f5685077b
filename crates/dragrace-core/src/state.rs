//! Race snapshot: the visible state handed to the renderer after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::RacePhase;
use crate::events::{RaceEvent, ShiftFeedback};

/// Complete race state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub tick: u64,
    pub phase: RacePhase,
    /// Seconds since the start, 0 during the countdown.
    pub elapsed_secs: f64,
    pub player: CarView,
    pub opponent: CarView,
    /// Latest shift feedback while inside its display window.
    pub shift_feedback: Option<ShiftFeedback>,
    /// Events raised during this tick.
    pub events: Vec<RaceEvent>,
}

/// Dashboard values for one car.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarView {
    /// Distance covered (m).
    pub distance: f64,
    /// Fraction of the track covered, 0.0 - 1.0.
    pub progress: f64,
    /// Speed (km/h).
    pub speed_kmh: f64,
    pub rpm: f64,
    pub gear: u8,
    pub wheel_spinning: bool,
    pub finished: bool,
    pub finish_time: Option<f64>,
}
