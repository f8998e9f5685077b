//! Car, replay and result types.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{CoreResult, RaceError};

/// Tuning stats of a car. Each stat is in [1, 10].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CarStats {
    pub acceleration: u8,
    pub top_speed: u8,
    pub grip: u8,
}

impl CarStats {
    /// Build stats from external input, rejecting values outside [1, 10].
    pub fn new(acceleration: u8, top_speed: u8, grip: u8) -> CoreResult<Self> {
        for (name, value) in [
            ("acceleration", acceleration),
            ("top_speed", top_speed),
            ("grip", grip),
        ] {
            if !(STAT_MIN..=STAT_MAX).contains(&value) {
                return Err(RaceError::StatOutOfRange { name, value });
            }
        }
        Ok(Self {
            acceleration,
            top_speed,
            grip,
        })
    }

    /// Normalize a stat to [0, 1].
    pub fn normalized(stat: u8) -> f64 {
        (stat as f64 - STAT_MIN as f64) / STAT_SPAN
    }
}

impl Default for CarStats {
    fn default() -> Self {
        Self {
            acceleration: 6,
            top_speed: 6,
            grip: 6,
        }
    }
}

/// Mutable kinematic state of one car. Exclusively owned by the race session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarPhysicsState {
    /// Distance from the start line (m).
    pub distance: f64,
    /// Speed (m/s).
    pub speed: f64,
    pub rpm: f64,
    /// Current gear, 1..=6.
    pub gear: u8,
    pub finished: bool,
    /// Clock time at which the race started for this car (seconds).
    pub start_time: f64,
    /// Elapsed seconds from start to finish. Set once.
    pub finish_time: Option<f64>,
    pub wheel_spinning: bool,
}

impl CarPhysicsState {
    /// A car on the line, idling in first gear.
    pub fn new(start_time: f64) -> Self {
        Self {
            distance: 0.0,
            speed: 0.0,
            rpm: IDLE_RPM,
            gear: 1,
            finished: false,
            start_time,
            finish_time: None,
            wheel_spinning: false,
        }
    }

    /// Fraction of the track covered, in [0, 1].
    pub fn progress(&self) -> f64 {
        (self.distance / TRACK_LENGTH).clamp(0.0, 1.0)
    }

    /// Mark the car finished. Has no effect on an already finished car.
    pub fn finish(&mut self, finish_time: f64) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.finish_time = Some(finish_time);
    }
}

impl Default for CarPhysicsState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Cosmetic car design. Never read by physics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarDesign {
    /// Body color as a hex string, e.g. "#d7263d".
    pub paint: String,
    pub accent: Option<String>,
}

/// A competitor in the other lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opponent {
    pub name: String,
    pub stats: CarStats,
    /// Shift point multiplier, nominally 0.8..=1.2.
    pub difficulty: f64,
    /// Whether the opponent is a ghost of a previous run.
    #[serde(default)]
    pub is_ghost: bool,
}

impl Opponent {
    pub fn new(name: impl Into<String>, stats: CarStats, difficulty: f64) -> CoreResult<Self> {
        if !difficulty.is_finite() || difficulty <= 0.0 {
            return Err(RaceError::InvalidDifficulty(difficulty));
        }
        Ok(Self {
            name: name.into(),
            stats,
            difficulty,
            is_ghost: false,
        })
    }
}

/// One recorded sample of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostDataPoint {
    /// Seconds since the start.
    pub t: f64,
    /// Distance covered (m).
    pub d: f64,
}

/// A recorded run that can be raced again as a ghost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostReplay {
    pub id: String,
    pub player_name: String,
    /// Finish time of the recorded run (seconds).
    pub total_time: f64,
    /// Samples, strictly ascending in `t`. Sampling interval is not uniform.
    pub data: Vec<GhostDataPoint>,
    /// Unix timestamp (seconds) of the run.
    pub date: u64,
    #[serde(default)]
    pub design: Option<CarDesign>,
}

impl GhostReplay {
    /// Build a replay from a finished race.
    pub fn from_result(
        id: impl Into<String>,
        player_name: impl Into<String>,
        result: &RaceResult,
        date: u64,
        design: Option<CarDesign>,
    ) -> Self {
        Self {
            id: id.into(),
            player_name: player_name.into(),
            total_time: result.player_time(),
            data: result.replay_data().to_vec(),
            date,
            design,
        }
    }

    /// Check the total time is finite and within `[0, MAX_GHOST_TIME]`, and
    /// that samples are finite, strictly ascending in `t` and never lose
    /// distance.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=MAX_GHOST_TIME).contains(&self.total_time) {
            return Err(RaceError::MalformedGhost(format!(
                "total time {} is outside 0..={MAX_GHOST_TIME} s",
                self.total_time
            )));
        }
        if self.data.iter().any(|p| !p.t.is_finite() || !p.d.is_finite()) {
            return Err(RaceError::MalformedGhost("non-finite sample".into()));
        }
        for (i, pair) in self.data.windows(2).enumerate() {
            if !(pair[1].t > pair[0].t) {
                return Err(RaceError::MalformedGhost(format!(
                    "sample {} at t={} does not follow t={}",
                    i + 1,
                    pair[1].t,
                    pair[0].t
                )));
            }
            if pair[1].d < pair[0].d {
                return Err(RaceError::MalformedGhost(format!(
                    "sample {} falls back from d={} to d={}",
                    i + 1,
                    pair[0].d,
                    pair[1].d
                )));
            }
        }
        Ok(())
    }

    /// Drop samples that are non-finite, break strict `t` ordering or fall
    /// back in distance. The total time is left alone; see [`Self::validate`].
    pub fn sanitized(mut self) -> Self {
        let before = self.data.len();
        let mut last_t = f64::NEG_INFINITY;
        let mut last_d = f64::NEG_INFINITY;
        self.data.retain(|p| {
            let keep = p.t.is_finite() && p.d.is_finite() && p.t > last_t && p.d >= last_d;
            if keep {
                last_t = p.t;
                last_d = p.d;
            }
            keep
        });
        let dropped = before - self.data.len();
        if dropped > 0 {
            tracing::warn!(
                ghost = %self.id,
                dropped,
                "Dropped malformed ghost samples"
            );
        }
        self
    }
}

/// Outcome of a finished race. `player_won` is derived from the two times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceResult {
    player_time: f64,
    enemy_time: f64,
    player_won: bool,
    /// Peak player speed (km/h).
    max_speed: f64,
    perfect_shifts: u32,
    replay_data: Vec<GhostDataPoint>,
}

impl RaceResult {
    /// Assemble a result. Ties go to the opponent.
    pub fn new(
        player_time: f64,
        enemy_time: f64,
        max_speed: f64,
        perfect_shifts: u32,
        replay_data: Vec<GhostDataPoint>,
    ) -> Self {
        Self {
            player_time,
            enemy_time,
            player_won: player_time < enemy_time,
            max_speed,
            perfect_shifts,
            replay_data,
        }
    }

    pub fn player_time(&self) -> f64 {
        self.player_time
    }

    pub fn enemy_time(&self) -> f64 {
        self.enemy_time
    }

    pub fn player_won(&self) -> bool {
        self.player_won
    }

    /// Peak player speed (km/h).
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn perfect_shifts(&self) -> u32 {
        self.perfect_shifts
    }

    /// The player's recorded trace.
    pub fn replay_data(&self) -> &[GhostDataPoint] {
        &self.replay_data
    }
}
