//! Error types for validating race input.

use thiserror::Error;

/// Errors raised when external input does not satisfy the race contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RaceError {
    #[error("Stat {name} out of range: {value} (expected 1..=10)")]
    StatOutOfRange { name: &'static str, value: u8 },

    #[error("Invalid difficulty: {0} (expected a finite value > 0)")]
    InvalidDifficulty(f64),

    #[error("Malformed ghost replay: {0}")]
    MalformedGhost(String),
}

/// Result type for core validation.
pub type CoreResult<T> = Result<T, RaceError>;
