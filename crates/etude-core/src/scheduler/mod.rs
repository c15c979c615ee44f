//! SM-2 style spaced-repetition scheduling for practice spots.
//!
//! [`SpotScheduler::schedule`] takes a spot and one new attempt and returns
//! the updated SRS parameters without touching the spot. The caller (the
//! storage layer) applies the outcome in a single write, so a rejected
//! attempt never leaves a partial update behind.
//!
//! ```text
//! quality >= 3: ease' = max(1.3, ease + 0.1 - (5-q)(0.08 + (5-q)0.02))
//!               reps += 1; interval' = 1, 6, round(interval * ease')
//! quality <  3: reps = 0; interval' = 1; ease unchanged
//! next_due'   = attempt.timestamp + interval' days
//! ```
//!
//! Attempts must arrive in time order: one dated before the spot's latest
//! logged attempt, or before its last scheduling, is rejected so `next_due`
//! never moves backwards on success.

mod due;

pub use due::{due_spots, DueSpot, DueState};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::spot::{PracticeAttempt, PracticeSpot, Quality, SrsState, MIN_EASE_FACTOR};

/// Scheduler tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Ease factor for a spot without prior state
    #[serde(default = "default_initial_ease")]
    pub initial_ease_factor: f64,
    /// Interval after the second consecutive success
    #[serde(default = "default_second_interval")]
    pub second_interval_days: u32,
    /// Upper bound on any interval
    #[serde(default = "default_max_interval")]
    pub max_interval_days: u32,
}

fn default_initial_ease() -> f64 {
    2.5
}
fn default_second_interval() -> u32 {
    6
}
fn default_max_interval() -> u32 {
    36_500
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease_factor: default_initial_ease(),
            second_interval_days: default_second_interval(),
            max_interval_days: default_max_interval(),
        }
    }
}

/// Values to persist after an attempt.
///
/// `srs` is `None` for unrated attempts, which only bump the repeat count.
/// Only the scheduler creates outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[non_exhaustive]
pub struct ScheduleOutcome {
    pub srs: Option<SrsState>,
    pub repeat_count: u32,
    pub readiness: f64,
}

/// Change to a spot's cached readiness for a quality rating, in points.
pub fn readiness_delta(quality: Quality) -> f64 {
    match quality.value() {
        5 => 20.0,
        4 => 10.0,
        3 => 5.0,
        2 => -5.0,
        _ => -10.0,
    }
}

/// SM-2 ease adjustment for a successful rating, floored at 1.3.
pub fn adjusted_ease(ease_factor: f64, quality: Quality) -> f64 {
    let miss = f64::from(Quality::MAX - quality.value());
    (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}

/// Spaced-repetition scheduler.
#[derive(Debug, Clone, Default)]
pub struct SpotScheduler {
    config: SchedulerConfig,
}

impl SpotScheduler {
    /// Create a scheduler with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Compute the state a spot moves to after `attempt`.
    ///
    /// # Errors
    /// Rejects invalid quality or duration, an attempt logged against another
    /// spot, and soft-deleted spots. Nothing is computed in that case.
    pub fn schedule(
        &self,
        spot: &PracticeSpot,
        attempt: &PracticeAttempt,
    ) -> Result<ScheduleOutcome, ValidationError> {
        if spot.is_deleted() {
            return Err(ValidationError::SpotDeleted(spot.id.clone()));
        }
        if attempt.spot_id != spot.id {
            return Err(ValidationError::SpotMismatch {
                spot: spot.id.clone(),
                attempt_spot: attempt.spot_id.clone(),
            });
        }
        attempt.validate()?;
        if let Some(last) = last_activity(spot) {
            if attempt.timestamp < last {
                return Err(ValidationError::AttemptOutOfOrder {
                    spot: spot.id.clone(),
                    timestamp: attempt.timestamp,
                    last,
                });
            }
        }

        let repeat_count = spot.repeat_count.saturating_add(1);
        let Some(quality) = attempt.rated_quality()? else {
            return Ok(ScheduleOutcome {
                srs: None,
                repeat_count,
                readiness: spot.cached_readiness(),
            });
        };

        let current = spot
            .srs()
            .copied()
            .unwrap_or_else(|| SrsState::with_ease(self.config.initial_ease_factor));
        let next = self.advance(&current, quality, attempt);
        let readiness = (spot.cached_readiness() + readiness_delta(quality)).clamp(0.0, 100.0);

        tracing::debug!(
            spot = %spot.id,
            quality = quality.value(),
            ease = next.ease_factor(),
            interval = next.interval_days(),
            repetitions = next.repetitions(),
            "scheduled spot"
        );

        Ok(ScheduleOutcome {
            srs: Some(next),
            repeat_count,
            readiness,
        })
    }

    fn advance(&self, current: &SrsState, quality: Quality, attempt: &PracticeAttempt) -> SrsState {
        let (ease, interval, repetitions) = if quality.is_success() {
            let ease = adjusted_ease(current.ease_factor(), quality);
            let repetitions = current.repetitions().saturating_add(1);
            let interval = match repetitions {
                1 => 1,
                2 => self.config.second_interval_days.max(1),
                _ => {
                    let grown = (f64::from(current.interval_days()) * ease).round();
                    grown.min(f64::from(self.config.max_interval_days)) as u32
                }
            };
            (ease, interval, repetitions)
        } else {
            (current.ease_factor(), 1, 0)
        };

        let interval = interval.clamp(1, self.config.max_interval_days.max(1));
        let next_due = attempt
            .timestamp
            .checked_add_signed(Duration::days(i64::from(interval)));

        // `interval >= 1` and `ease >= 1.3` hold by construction above.
        SrsState::from_stored(ease, i64::from(interval), repetitions, next_due)
    }
}

/// Latest of the last logged attempt and the instant the current SRS state
/// was scheduled from.
fn last_activity(spot: &PracticeSpot) -> Option<DateTime<Utc>> {
    let scheduled_at = spot.srs().and_then(|srs| {
        srs.next_due()?
            .checked_sub_signed(Duration::days(i64::from(srs.interval_days())))
    });
    spot.last_practiced().max(scheduled_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::{SpotBounds, SpotColor};
    use chrono::{TimeZone, Utc};

    fn spot() -> PracticeSpot {
        PracticeSpot::new(1, SpotBounds::new(0.1, 0.1, 0.2, 0.2).unwrap(), SpotColor::Red)
            .unwrap()
            .with_id("spot-1")
    }

    fn attempt(quality: Option<u8>) -> PracticeAttempt {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 18, 0, 0).unwrap();
        PracticeAttempt::new("spot-1", at, 10.0, quality).unwrap()
    }

    #[test]
    fn first_perfect_attempt() {
        let scheduler = SpotScheduler::new();
        let a = attempt(Some(5));
        let outcome = scheduler.schedule(&spot(), &a).unwrap();
        let srs = outcome.srs.unwrap();
        assert_eq!(srs.repetitions(), 1);
        assert_eq!(srs.interval_days(), 1);
        assert!((srs.ease_factor() - 2.6).abs() < 1e-9);
        assert_eq!(srs.next_due(), Some(a.timestamp + Duration::days(1)));
        assert_eq!(outcome.repeat_count, 1);
        assert_eq!(outcome.readiness, 20.0);
    }

    #[test]
    fn third_success_grows_interval() {
        let scheduler = SpotScheduler::new();
        let spot = spot().with_srs(SrsState::new(2.5, 6, 2, None).unwrap());
        let srs = scheduler.schedule(&spot, &attempt(Some(4))).unwrap().srs.unwrap();
        assert_eq!(srs.repetitions(), 3);
        assert!((srs.ease_factor() - 2.5).abs() < 1e-9);
        assert_eq!(srs.interval_days(), 15);
    }

    #[test]
    fn failure_resets_cycle() {
        let scheduler = SpotScheduler::new();
        let spot = spot().with_srs(SrsState::new(2.1, 15, 3, None).unwrap());
        let srs = scheduler.schedule(&spot, &attempt(Some(2))).unwrap().srs.unwrap();
        assert_eq!(srs.repetitions(), 0);
        assert_eq!(srs.interval_days(), 1);
        assert!((srs.ease_factor() - 2.1).abs() < 1e-9);
    }

    #[test]
    fn unrated_attempt_only_counts() {
        let scheduler = SpotScheduler::new();
        let spot = spot().with_srs(SrsState::new(2.5, 6, 2, None).unwrap());
        let outcome = scheduler.schedule(&spot, &attempt(None)).unwrap();
        assert!(outcome.srs.is_none());
        assert_eq!(outcome.repeat_count, 1);
        assert_eq!(outcome.readiness, 0.0);
    }

    #[test]
    fn invalid_quality_is_rejected() {
        let scheduler = SpotScheduler::new();
        let mut a = attempt(Some(3));
        a.quality = Some(0);
        assert_eq!(
            scheduler.schedule(&spot(), &a).unwrap_err(),
            ValidationError::InvalidQuality(0)
        );
    }

    #[test]
    fn deleted_or_foreign_spot_is_rejected() {
        let scheduler = SpotScheduler::new();
        let mut deleted = spot();
        deleted.soft_delete(Utc::now());
        assert!(matches!(
            scheduler.schedule(&deleted, &attempt(Some(4))),
            Err(ValidationError::SpotDeleted(_))
        ));

        let other = spot().with_id("spot-2");
        assert!(matches!(
            scheduler.schedule(&other, &attempt(Some(4))),
            Err(ValidationError::SpotMismatch { .. })
        ));
    }

    #[test]
    fn backdated_attempt_is_rejected() {
        let scheduler = SpotScheduler::new();
        let last = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let logged = PracticeAttempt::new("spot-1", last, 10.0, Some(5)).unwrap();
        let spot = spot()
            .with_srs(SrsState::new(2.5, 15, 3, Some(last + Duration::days(15))).unwrap())
            .with_history(vec![logged]);

        let early = PracticeAttempt::new("spot-1", last - Duration::days(30), 10.0, Some(5)).unwrap();
        assert_eq!(
            scheduler.schedule(&spot, &early).unwrap_err(),
            ValidationError::AttemptOutOfOrder {
                spot: "spot-1".into(),
                timestamp: early.timestamp,
                last,
            }
        );

        // Same check from the SRS state alone when the log is empty.
        let bare = spot.clone().with_history(Vec::new());
        assert!(matches!(
            scheduler.schedule(&bare, &early),
            Err(ValidationError::AttemptOutOfOrder { .. })
        ));

        let srs = scheduler.schedule(&spot, &attempt(Some(5))).unwrap().srs.unwrap();
        assert!(srs.next_due().unwrap() >= last + Duration::days(15));
    }

    #[test]
    fn quality_three_lowers_ease() {
        let q = Quality::try_from(3).unwrap();
        assert!((adjusted_ease(2.5, q) - 2.36).abs() < 1e-9);
        assert_eq!(adjusted_ease(1.3, q), MIN_EASE_FACTOR);
    }

    #[test]
    fn readiness_deltas() {
        let deltas: Vec<f64> = (1..=5)
            .map(|q| readiness_delta(Quality::try_from(q).unwrap()))
            .collect();
        assert_eq!(deltas, vec![-10.0, -5.0, 5.0, 10.0, 20.0]);
    }

    #[test]
    fn interval_is_capped() {
        let scheduler = SpotScheduler::with_config(SchedulerConfig {
            max_interval_days: 30,
            ..Default::default()
        });
        let spot = spot().with_srs(SrsState::new(2.5, 20, 5, None).unwrap());
        let srs = scheduler.schedule(&spot, &attempt(Some(5))).unwrap().srs.unwrap();
        assert_eq!(srs.interval_days(), 30);
    }
}
