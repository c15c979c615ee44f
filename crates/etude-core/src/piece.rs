//! Pieces: a score with its marked spots and practice totals.
//!
//! Piece readiness is never stored here; it is recomputed from the spots on
//! every read by the aggregator.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::spot::PracticeSpot;

/// A piece under preparation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub composer: Option<String>,
    /// Spots in page/position order, unique by id.
    #[serde(default)]
    spots: Vec<PracticeSpot>,
    /// Accumulated practice time across all sessions.
    #[serde(default)]
    pub total_practice_minutes: f64,
    #[serde(default)]
    pub target_tempo: Option<f64>,
    #[serde(default)]
    pub current_tempo: Option<f64>,
    #[serde(default)]
    pub concert_date: Option<NaiveDate>,
    /// Declared difficulty, 1 (easy) to 5 (hard).
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

fn default_difficulty() -> u8 {
    3
}

impl Piece {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            composer: None,
            spots: Vec::new(),
            total_practice_minutes: 0.0,
            target_tempo: None,
            current_tempo: None,
            concert_date: None,
            difficulty: default_difficulty(),
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&difficulty) {
            return Err(ValidationError::InvalidValue {
                field: "difficulty".into(),
                message: format!("must be between 1 and 5, got {difficulty}"),
            });
        }
        self.difficulty = difficulty;
        Ok(self)
    }

    /// Set target and current tempo in BPM. Both must be positive.
    pub fn with_tempo(mut self, target: f64, current: f64) -> Result<Self, ValidationError> {
        for (field, bpm) in [("target_tempo", target), ("current_tempo", current)] {
            if !bpm.is_finite() || bpm <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("tempo must be a positive BPM, got {bpm}"),
                });
            }
        }
        self.target_tempo = Some(target);
        self.current_tempo = Some(current);
        Ok(self)
    }

    pub fn with_practice_minutes(mut self, minutes: f64) -> Self {
        self.total_practice_minutes = minutes.max(0.0);
        self
    }

    pub fn with_concert_date(mut self, date: NaiveDate) -> Self {
        self.concert_date = Some(date);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// All spots, including soft-deleted ones.
    pub fn spots(&self) -> &[PracticeSpot] {
        &self.spots
    }

    /// Spots that take part in scoring and ranking.
    pub fn active_spots(&self) -> impl Iterator<Item = &PracticeSpot> {
        self.spots.iter().filter(|s| !s.is_deleted())
    }

    pub fn spot(&self, spot_id: &str) -> Option<&PracticeSpot> {
        self.spots.iter().find(|s| s.id == spot_id)
    }

    pub fn spot_mut(&mut self, spot_id: &str) -> Option<&mut PracticeSpot> {
        self.spots.iter_mut().find(|s| s.id == spot_id)
    }

    /// Add a spot; ids must be unique within the piece.
    pub fn add_spot(&mut self, spot: PracticeSpot) -> Result<(), ValidationError> {
        if self.spot(&spot.id).is_some() {
            return Err(ValidationError::DuplicateSpot(spot.id));
        }
        spot.bounds.validate()?;
        self.spots.push(spot);
        Ok(())
    }

    /// Builder form of [`Piece::add_spot`].
    pub fn with_spot(mut self, spot: PracticeSpot) -> Result<Self, ValidationError> {
        self.add_spot(spot)?;
        Ok(self)
    }

    /// Remove a spot together with its attempt log.
    pub fn remove_spot(&mut self, spot_id: &str) -> Result<PracticeSpot, ValidationError> {
        let index = self
            .spots
            .iter()
            .position(|s| s.id == spot_id)
            .ok_or_else(|| ValidationError::SpotNotFound(spot_id.to_string()))?;
        Ok(self.spots.remove(index))
    }

    /// Most recent attempt across active spots.
    pub fn last_practiced(&self) -> Option<DateTime<Utc>> {
        self.active_spots().filter_map(PracticeSpot::last_practiced).max()
    }

    /// Case-insensitive tag match against any of `tags`.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags
            .iter()
            .any(|own| tags.iter().any(|t| t.eq_ignore_ascii_case(own)))
    }
}
