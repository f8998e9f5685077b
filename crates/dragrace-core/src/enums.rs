//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::constants::COUNTDOWN_START;

/// Race session phase (top-level state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "remaining")]
pub enum RacePhase {
    /// Lights counting down; the value is the number shown.
    Countdown(u8),
    /// Both cars are being simulated.
    Racing,
    /// Both cars crossed the line. Terminal.
    Finished,
}

impl Default for RacePhase {
    fn default() -> Self {
        RacePhase::Countdown(COUNTDOWN_START)
    }
}

/// Grade given to a manual upshift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftGrade {
    /// Below the useful power band.
    Early,
    /// Inside the power band but outside the perfect window.
    Good,
    /// Inside [7000, 7800) rpm.
    Perfect,
    /// Above redline minus 200 rpm.
    Late,
}

impl ShiftGrade {
    /// Upper-case label shown on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            ShiftGrade::Early => "EARLY",
            ShiftGrade::Good => "GOOD",
            ShiftGrade::Perfect => "PERFECT",
            ShiftGrade::Late => "LATE",
        }
    }
}

/// Which lane a car occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarSlot {
    Player,
    Opponent,
}
