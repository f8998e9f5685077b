//! Opponent flavor text (name and tagline).
//!
//! Flavor comes from an external generator that may be unavailable. Racing
//! never depends on it: stats and difficulty are always taken from the
//! requested profile, and the profile's own name is used as a fallback.

use dragrace_core::types::{CarStats, Opponent};

use crate::profiles::OpponentProfile;

/// Generated name and tagline for an opponent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentFlavor {
    pub name: String,
    pub tagline: String,
}

/// Something that can invent flavor text for an opponent car.
pub trait FlavorSource {
    /// Produce flavor for a car with `stats`. Errors are reported as text.
    fn generate(&self, stats: &CarStats) -> Result<OpponentFlavor, String>;
}

/// A source that is never available.
pub struct NoFlavor;

impl FlavorSource for NoFlavor {
    fn generate(&self, _stats: &CarStats) -> Result<OpponentFlavor, String> {
        Err("no flavor service configured".into())
    }
}

/// Build an opponent from `profile`, naming it through `source` when possible.
///
/// Returns the opponent and the tagline to show in the pre-race screen.
pub fn resolve_opponent(
    profile: &OpponentProfile,
    source: &dyn FlavorSource,
) -> (Opponent, String) {
    let mut opponent = profile.to_opponent();
    match source.generate(&profile.stats) {
        Ok(flavor) if !flavor.name.trim().is_empty() => {
            opponent.name = flavor.name;
            (opponent, flavor.tagline)
        }
        Ok(_) => {
            tracing::warn!("Flavor service returned an empty name, using profile defaults");
            (opponent, profile.tagline.to_string())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Flavor service unavailable, using profile defaults");
            (opponent, profile.tagline.to_string())
        }
    }
}
