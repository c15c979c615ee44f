//! Spaced-repetition state carried by each practice spot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lowest ease factor the SM-2 adjustment may reach.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to a spot that has never been scheduled.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// SM-2 parameters for one spot.
///
/// Fields are private: a value either comes from [`SrsState::new`], which
/// rejects invariant violations, or from storage via deserialization, which
/// clamps them. `next_due == None` means the spot is due now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredSrsState")]
pub struct SrsState {
    ease_factor: f64,
    interval_days: u32,
    repetitions: u32,
    next_due: Option<DateTime<Utc>>,
}

impl SrsState {
    /// State of a spot before its first rated attempt.
    pub fn initial() -> Self {
        Self::with_ease(INITIAL_EASE_FACTOR)
    }

    pub(crate) fn with_ease(ease_factor: f64) -> Self {
        Self {
            ease_factor: ease_factor.max(MIN_EASE_FACTOR),
            interval_days: 1,
            repetitions: 0,
            next_due: None,
        }
    }

    /// Build a state, rejecting values that break the invariants.
    pub fn new(
        ease_factor: f64,
        interval_days: u32,
        repetitions: u32,
        next_due: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        if !ease_factor.is_finite() || ease_factor < MIN_EASE_FACTOR {
            return Err(ValidationError::InvalidValue {
                field: "ease_factor".into(),
                message: format!("must be at least {MIN_EASE_FACTOR}, got {ease_factor}"),
            });
        }
        if interval_days == 0 {
            return Err(ValidationError::InvalidValue {
                field: "interval_days".into(),
                message: "must be a positive number of days".into(),
            });
        }
        Ok(Self {
            ease_factor,
            interval_days,
            repetitions,
            next_due,
        })
    }

    /// Build a state from stored values, clamping anything out of bounds.
    pub fn from_stored(
        ease_factor: f64,
        interval_days: i64,
        repetitions: u32,
        next_due: Option<DateTime<Utc>>,
    ) -> Self {
        let ease = if !ease_factor.is_finite() {
            tracing::warn!(ease_factor, "stored ease factor is not finite, resetting");
            INITIAL_EASE_FACTOR
        } else if ease_factor < MIN_EASE_FACTOR {
            tracing::warn!(ease_factor, "stored ease factor below minimum, clamping");
            MIN_EASE_FACTOR
        } else {
            ease_factor
        };

        let interval = if interval_days < 1 {
            tracing::warn!(interval_days, "stored interval is not positive, clamping");
            1
        } else {
            u32::try_from(interval_days).unwrap_or(u32::MAX)
        };

        Self {
            ease_factor: ease,
            interval_days: interval,
            repetitions,
            next_due,
        }
    }

    pub fn ease_factor(&self) -> f64 {
        self.ease_factor
    }

    pub fn interval_days(&self) -> u32 {
        self.interval_days
    }

    pub fn repetitions(&self) -> u32 {
        self.repetitions
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    /// A spot is due when it has no due date or the due date has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_due.map_or(true, |due| now >= due)
    }
}

impl Default for SrsState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Wire shape of [`SrsState`] as persisted by the storage layer.
#[derive(Debug, Deserialize)]
struct StoredSrsState {
    #[serde(default = "default_ease")]
    ease_factor: f64,
    #[serde(default = "default_interval")]
    interval_days: i64,
    #[serde(default)]
    repetitions: u32,
    #[serde(default)]
    next_due: Option<DateTime<Utc>>,
}

fn default_ease() -> f64 {
    INITIAL_EASE_FACTOR
}

fn default_interval() -> i64 {
    1
}

impl From<StoredSrsState> for SrsState {
    fn from(stored: StoredSrsState) -> Self {
        SrsState::from_stored(
            stored.ease_factor,
            stored.interval_days,
            stored.repetitions,
            stored.next_due,
        )
    }
}
