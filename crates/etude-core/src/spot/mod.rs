//! Practice spots: marked regions of a score that need work.
//!
//! A spot owns its SRS state and its append-only attempt log. The SRS state
//! and the cached readiness only change through [`PracticeSpot::record`],
//! which takes an outcome produced by the scheduler.

mod attempt;
mod srs;

pub use attempt::{PracticeAttempt, Quality};
pub use srs::{SrsState, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::scheduler::ScheduleOutcome;

/// Difficulty color tag of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotColor {
    /// Critical
    Red,
    /// Needs review
    Yellow,
    /// Maintenance
    Green,
}

impl SpotColor {
    pub fn label(&self) -> &'static str {
        match self {
            SpotColor::Red => "critical",
            SpotColor::Yellow => "review",
            SpotColor::Green => "maintenance",
        }
    }
}

/// User-assigned priority of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Rectangle on a page, normalized to the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotBounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SpotBounds {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Result<Self, ValidationError> {
        let bounds = Self { x, y, w, h };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        let fits = unit(self.x)
            && unit(self.y)
            && unit(self.w)
            && unit(self.h)
            && self.x + self.w <= 1.0
            && self.y + self.h <= 1.0;
        if fits {
            Ok(())
        } else {
            Err(ValidationError::InvalidBounds {
                x: self.x,
                y: self.y,
                w: self.w,
                h: self.h,
            })
        }
    }
}

/// A marked practice region on one page of a piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSpot {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub page: u32,
    pub bounds: SpotBounds,
    pub color: SpotColor,
    #[serde(default)]
    pub priority: SpotPriority,
    /// `None` until the first rated attempt is scheduled.
    #[serde(default)]
    srs: Option<SrsState>,
    #[serde(default)]
    pub repeat_count: u32,
    #[serde(default, deserialize_with = "clamped_readiness")]
    readiness: f64,
    /// Attempt log, any order; scorers sort by timestamp themselves.
    #[serde(default)]
    pub history: Vec<PracticeAttempt>,
    /// Set when the spot is soft-deleted. Its attempts stay but are inert.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PracticeSpot {
    pub fn new(page: u32, bounds: SpotBounds, color: SpotColor) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidValue {
                field: "page".into(),
                message: "page numbers start at 1".into(),
            });
        }
        bounds.validate()?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            label: None,
            page,
            bounds,
            color,
            priority: SpotPriority::default(),
            srs: None,
            repeat_count: 0,
            readiness: 0.0,
            history: Vec::new(),
            deleted_at: None,
            created_at: Utc::now(),
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_priority(mut self, priority: SpotPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Seed the SRS state of a spot being loaded or imported.
    pub fn with_srs(mut self, srs: SrsState) -> Self {
        self.srs = Some(srs);
        self
    }

    /// Seed the attempt log of a spot being loaded or imported.
    pub fn with_history(mut self, history: Vec<PracticeAttempt>) -> Self {
        self.history = history;
        self
    }

    /// Stored SRS state, if the spot was ever scheduled.
    pub fn srs(&self) -> Option<&SrsState> {
        self.srs.as_ref()
    }

    /// SRS state, falling back to the initial one for never-scheduled spots.
    pub fn srs_or_initial(&self) -> SrsState {
        self.srs.unwrap_or_default()
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.srs.and_then(|s| s.next_due())
    }

    /// Cached readiness in [0, 100]. Derived data, never a source of truth.
    pub fn cached_readiness(&self) -> f64 {
        self.readiness
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(at);
        }
    }

    /// Timestamp of the most recent attempt, rated or not.
    pub fn last_practiced(&self) -> Option<DateTime<Utc>> {
        self.history.iter().map(|a| a.timestamp).max()
    }

    /// Append an attempt and apply the scheduler's outcome for it.
    pub fn record(&mut self, attempt: PracticeAttempt, outcome: &ScheduleOutcome) {
        if let Some(srs) = outcome.srs {
            self.srs = Some(srs);
        }
        self.repeat_count = outcome.repeat_count;
        self.readiness = outcome.readiness;
        self.history.push(attempt);
    }
}

fn clamped_readiness<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        tracing::warn!(value, "cached readiness out of range, clamping");
        Ok(if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> SpotBounds {
        SpotBounds::new(0.1, 0.2, 0.3, 0.1).unwrap()
    }

    #[test]
    fn bounds_must_fit_unit_square() {
        assert!(SpotBounds::new(0.0, 0.0, 1.0, 1.0).is_ok());
        assert!(SpotBounds::new(0.8, 0.0, 0.3, 0.1).is_err());
        assert!(SpotBounds::new(-0.1, 0.0, 0.3, 0.1).is_err());
        assert!(SpotBounds::new(0.1, 0.0, f64::NAN, 0.1).is_err());
    }

    #[test]
    fn new_spot_starts_fresh() {
        let spot = PracticeSpot::new(3, bounds(), SpotColor::Red).unwrap();
        assert!(spot.srs().is_none());
        assert!(spot.next_due().is_none());
        assert_eq!(spot.repeat_count, 0);
        assert_eq!(spot.cached_readiness(), 0.0);
        assert_eq!(spot.srs_or_initial(), SrsState::initial());
    }

    #[test]
    fn page_zero_is_rejected() {
        assert!(PracticeSpot::new(0, bounds(), SpotColor::Green).is_err());
    }

    #[test]
    fn soft_delete_keeps_first_timestamp() {
        let mut spot = PracticeSpot::new(1, bounds(), SpotColor::Yellow).unwrap();
        let first = Utc::now();
        spot.soft_delete(first);
        spot.soft_delete(first + chrono::Duration::days(1));
        assert_eq!(spot.deleted_at, Some(first));
        assert!(spot.is_deleted());
    }

    #[test]
    fn stored_readiness_is_clamped() {
        let mut value = serde_json::to_value(
            PracticeSpot::new(1, bounds(), SpotColor::Red).unwrap().with_id("a"),
        )
        .unwrap();
        value["readiness"] = serde_json::json!(180.0);
        let spot: PracticeSpot = serde_json::from_value(value).unwrap();
        assert_eq!(spot.cached_readiness(), 100.0);
    }

    #[test]
    fn color_labels() {
        assert_eq!(SpotColor::Red.label(), "critical");
        assert_eq!(SpotColor::Green.label(), "maintenance");
    }
}
