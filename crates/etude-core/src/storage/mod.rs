//! Configuration files and the in-memory library snapshot.
//!
//! The engine never persists practice data itself. [`Library`] is the plain
//! snapshot a host hands to the engine (and that the CLI reads from JSON);
//! [`Library::record_attempt`] is the single read-modify-write per attempt
//! that a storage backend would wrap in its own transaction.

mod config;

pub use config::Config;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result, ValidationError};
use crate::piece::Piece;
use crate::project::Project;
use crate::scheduler::{ScheduleOutcome, SpotScheduler};
use crate::spot::{PracticeAttempt, PracticeSpot};

/// Returns `~/.config/etude[-dev]/` based on ETUDE_ENV.
///
/// Set ETUDE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ETUDE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("etude-dev")
    } else {
        base_dir.join("etude")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirectoryUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Pieces and projects as loaded from storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub pieces: Vec<Piece>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Library {
    /// Read a JSON snapshot.
    ///
    /// # Errors
    /// Fails on I/O or JSON errors, and when a spot id appears more than once
    /// anywhere in the library.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let library: Self = serde_json::from_str(&content)?;
        library.validate()?;
        Ok(library)
    }

    /// Check that spot ids are unique across all pieces.
    ///
    /// Attempts address spots by id alone, so a duplicate would make
    /// [`Library::record_attempt`] ambiguous.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for spot in self.pieces.iter().flat_map(|p| p.spots()) {
            if !seen.insert(spot.id.as_str()) {
                return Err(ValidationError::DuplicateSpot(spot.id.clone()));
            }
        }
        Ok(())
    }

    /// Write a JSON snapshot.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn piece(&self, piece_id: &str) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == piece_id)
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    /// Locate a spot and its parent piece.
    pub fn find_spot(&self, spot_id: &str) -> Option<(&Piece, &PracticeSpot)> {
        self.pieces
            .iter()
            .find_map(|piece| piece.spot(spot_id).map(|spot| (piece, spot)))
    }

    /// Schedule `attempt` and apply the outcome to its spot.
    ///
    /// The attempt is appended to the spot's log and its duration added to
    /// the piece's practice total. On error nothing changes.
    pub fn record_attempt(
        &mut self,
        scheduler: &SpotScheduler,
        attempt: PracticeAttempt,
    ) -> Result<ScheduleOutcome, ValidationError> {
        let piece = self
            .pieces
            .iter_mut()
            .find(|p| p.spot(&attempt.spot_id).is_some())
            .ok_or_else(|| ValidationError::SpotNotFound(attempt.spot_id.clone()))?;
        let duration = attempt.duration_minutes;
        let spot = piece
            .spot_mut(&attempt.spot_id)
            .ok_or_else(|| ValidationError::SpotNotFound(attempt.spot_id.clone()))?;

        let outcome = scheduler.schedule(spot, &attempt)?;
        spot.record(attempt, &outcome);
        piece.total_practice_minutes += duration;
        Ok(outcome)
    }
}
