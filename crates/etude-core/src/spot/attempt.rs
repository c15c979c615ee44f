//! Practice attempt log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Self-rating of a single practice attempt (1-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }

    /// Ratings of 3 and above count as a successful repetition.
    pub fn is_success(self) -> bool {
        self.0 >= 3
    }
}

impl TryFrom<u8> for Quality {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidQuality(value))
        }
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// One immutable entry of a spot's practice log.
///
/// Attempts arrive from storage as plain records, so the quality is kept as a
/// raw byte and checked again by [`PracticeAttempt::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeAttempt {
    pub id: String,
    pub spot_id: String,
    pub timestamp: DateTime<Utc>,
    pub duration_minutes: f64,
    #[serde(default)]
    pub quality: Option<u8>,
    #[serde(default)]
    pub note: Option<String>,
}

impl PracticeAttempt {
    /// Create a validated attempt.
    pub fn new(
        spot_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        duration_minutes: f64,
        quality: Option<u8>,
    ) -> Result<Self, ValidationError> {
        let attempt = Self {
            id: Uuid::new_v4().to_string(),
            spot_id: spot_id.into(),
            timestamp,
            duration_minutes,
            quality,
            note: None,
        };
        attempt.validate()?;
        Ok(attempt)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check duration and quality.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.duration_minutes.is_finite() || self.duration_minutes <= 0.0 {
            return Err(ValidationError::InvalidDuration(self.duration_minutes));
        }
        self.rated_quality()?;
        Ok(())
    }

    /// Typed quality, `None` for unrated attempts.
    pub fn rated_quality(&self) -> Result<Option<Quality>, ValidationError> {
        self.quality.map(Quality::try_from).transpose()
    }

    /// Success flag for rated attempts with a valid quality.
    ///
    /// Out-of-range ratings found in stored history are ignored.
    pub fn outcome(&self) -> Option<bool> {
        self.rated_quality().ok().flatten().map(Quality::is_success)
    }
}
