//! Best-run ghost storage.
//!
//! One pretty-printed JSON file per store directory holds the fastest run
//! seen so far. A new run replaces it only when strictly faster.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use dragrace_core::error::RaceError;
use dragrace_core::types::{CarDesign, GhostReplay, RaceResult};

const BEST_GHOST_FILE: &str = "best_ghost.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("ghost store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("ghost file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("stored ghost is unusable: {0}")]
    Malformed(#[from] RaceError),
}

/// Directory-backed store for the best ghost.
#[derive(Debug, Clone)]
pub struct GhostStore {
    dir: PathBuf,
}

impl GhostStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn best_path(&self) -> PathBuf {
        self.dir.join(BEST_GHOST_FILE)
    }

    /// Load the stored best run, if any. Malformed samples are dropped; a
    /// total time that is negative, non-finite or too long is an error.
    pub fn load_best(&self) -> Result<Option<GhostReplay>, StoreError> {
        let path = self.best_path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)?;
        let ghost = serde_json::from_str::<GhostReplay>(&json)?.sanitized();
        ghost.validate()?;
        Ok(Some(ghost))
    }

    /// Overwrite the stored best run.
    pub fn save(&self, ghost: &GhostReplay) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(ghost)?;
        fs::write(self.best_path(), json)?;
        Ok(())
    }

    /// Keep `result` as the new best if there is none yet or it is strictly
    /// faster. Returns whether it was stored.
    ///
    /// An unreadable or malformed best file is replaced.
    pub fn offer(
        &self,
        result: &RaceResult,
        player_name: &str,
        design: Option<CarDesign>,
    ) -> Result<bool, StoreError> {
        let current = match self.load_best() {
            Ok(current) => current,
            Err(err @ (StoreError::Json(_) | StoreError::Malformed(_))) => {
                tracing::warn!(error = %err, "Discarding unreadable best ghost");
                None
            }
            Err(err) => return Err(err),
        };

        if let Some(best) = &current {
            if result.player_time() >= best.total_time {
                tracing::debug!(
                    time = result.player_time(),
                    best = best.total_time,
                    "Run not faster than best ghost"
                );
                return Ok(false);
            }
        }

        let date = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let ghost = GhostReplay::from_result(
            format!("ghost-{date}"),
            player_name,
            result,
            date,
            design,
        );
        self.save(&ghost)?;
        tracing::info!(
            time = ghost.total_time,
            samples = ghost.data.len(),
            "Stored new best ghost"
        );
        Ok(true)
    }

    /// Remove the stored best run.
    pub fn clear(&self) -> Result<(), StoreError> {
        let path = self.best_path();
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}
