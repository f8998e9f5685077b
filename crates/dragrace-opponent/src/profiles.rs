//! Opponent presets.
//!
//! Consolidates the stats and difficulty of the built-in opponents.

use std::str::FromStr;

use dragrace_core::constants::DEFAULT_DIFFICULTY;
use dragrace_core::types::{CarStats, Opponent};

/// Built-in opponent tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OpponentTier {
    /// Soft car, shifts early.
    Rookie,
    /// The default opponent: balanced 6/6/6, nominal difficulty.
    #[default]
    Street,
    /// Strong car, holds gears longer.
    Pro,
}

/// Stats and behavior of an opponent tier.
pub struct OpponentProfile {
    pub name: &'static str,
    pub tagline: &'static str,
    pub stats: CarStats,
    pub difficulty: f64,
}

/// Get the profile for a given tier.
pub fn get_profile(tier: OpponentTier) -> OpponentProfile {
    match tier {
        OpponentTier::Rookie => OpponentProfile {
            name: "Rookie",
            tagline: "Borrowed the car from an older brother.",
            stats: CarStats {
                acceleration: 4,
                top_speed: 4,
                grip: 5,
            },
            difficulty: 0.8,
        },
        OpponentTier::Street => OpponentProfile {
            name: "Street Rival",
            tagline: "Runs the boulevard every Friday night.",
            stats: CarStats::default(),
            difficulty: DEFAULT_DIFFICULTY,
        },
        OpponentTier::Pro => OpponentProfile {
            name: "Pro Racer",
            tagline: "Has a sponsor and a spare set of slicks.",
            stats: CarStats {
                acceleration: 8,
                top_speed: 8,
                grip: 7,
            },
            difficulty: 1.2,
        },
    }
}

impl OpponentProfile {
    /// Turn the profile into an opponent.
    pub fn to_opponent(&self) -> Opponent {
        Opponent {
            name: self.name.to_string(),
            stats: self.stats,
            difficulty: self.difficulty,
            is_ghost: false,
        }
    }
}

/// The opponent used when nothing else is selected.
pub fn default_opponent() -> Opponent {
    get_profile(OpponentTier::Street).to_opponent()
}

impl FromStr for OpponentTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rookie" => Ok(OpponentTier::Rookie),
            "street" => Ok(OpponentTier::Street),
            "pro" => Ok(OpponentTier::Pro),
            other => Err(format!(
                "Unknown opponent tier: {other} (expected rookie, street or pro)"
            )),
        }
    }
}
