//! Readiness scoring for spots and pieces.
//!
//! Scores are derived values in [0, 100], recomputed on demand from the
//! attempt history and an injected clock. Nothing here performs I/O or keeps
//! state between calls.

pub mod factors;
mod piece;
mod spot;

pub use piece::{PieceReadinessAggregator, PieceReadinessBreakdown};
pub use spot::SpotReadinessScorer;

use serde::{Deserialize, Serialize};

use crate::spot::SpotColor;

/// Readiness bands shared by dashboards and the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessLevel {
    /// [0, 25)
    NotReady,
    /// [25, 50)
    Learning,
    /// [50, 75)
    Practicing,
    /// [75, 90)
    Polishing,
    /// [90, 100]
    PerformanceReady,
}

impl ReadinessLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => ReadinessLevel::PerformanceReady,
            s if s >= 75.0 => ReadinessLevel::Polishing,
            s if s >= 50.0 => ReadinessLevel::Practicing,
            s if s >= 25.0 => ReadinessLevel::Learning,
            _ => ReadinessLevel::NotReady,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReadinessLevel::NotReady => "Not ready",
            ReadinessLevel::Learning => "Learning",
            ReadinessLevel::Practicing => "Practicing",
            ReadinessLevel::Polishing => "Polishing",
            ReadinessLevel::PerformanceReady => "Performance ready",
        }
    }
}

impl std::fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Weight of each color in the piece's weighted mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorWeights {
    pub red: f64,
    pub yellow: f64,
    pub green: f64,
}

impl ColorWeights {
    pub fn weight(&self, color: SpotColor) -> f64 {
        match color {
            SpotColor::Red => self.red,
            SpotColor::Yellow => self.yellow,
            SpotColor::Green => self.green,
        }
    }
}

impl Default for ColorWeights {
    fn default() -> Self {
        Self {
            red: 3.0,
            yellow: 2.0,
            green: 1.0,
        }
    }
}

/// Readiness tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Maximum practice-time bonus (0.3 = +30%)
    #[serde(default = "default_practice_bonus")]
    pub practice_bonus: f64,
    /// Hours of practice at which the bonus saturates
    #[serde(default = "default_practice_saturation_hours")]
    pub practice_saturation_hours: f64,
    /// Multiplier at or above target tempo
    #[serde(default = "default_tempo_bonus")]
    pub tempo_bonus: f64,
    /// Tempo ratio below which under-tempo work is penalized
    #[serde(default = "default_tempo_floor_ratio")]
    pub tempo_floor_ratio: f64,
    #[serde(default = "default_concert_urgent_days")]
    pub concert_urgent_days: i64,
    #[serde(default = "default_concert_near_days")]
    pub concert_near_days: i64,
    /// Calendar days considered for practice consistency
    #[serde(default = "default_consistency_window_days")]
    pub consistency_window_days: u32,
    /// Score of a piece without spots after some practice
    #[serde(default = "default_empty_practiced_score")]
    pub empty_practiced_score: f64,
    /// Score of a piece without spots and little practice
    #[serde(default = "default_empty_unpracticed_score")]
    pub empty_unpracticed_score: f64,
    /// Practice minutes separating the two empty-piece scores
    #[serde(default = "default_empty_practice_threshold_minutes")]
    pub empty_practice_threshold_minutes: f64,
    #[serde(default)]
    pub color_weights: ColorWeights,
}

fn default_practice_bonus() -> f64 {
    0.3
}
fn default_practice_saturation_hours() -> f64 {
    6.7
}
fn default_tempo_bonus() -> f64 {
    1.2
}
fn default_tempo_floor_ratio() -> f64 {
    0.8
}
fn default_concert_urgent_days() -> i64 {
    7
}
fn default_concert_near_days() -> i64 {
    30
}
fn default_consistency_window_days() -> u32 {
    7
}
fn default_empty_practiced_score() -> f64 {
    85.0
}
fn default_empty_unpracticed_score() -> f64 {
    45.0
}
fn default_empty_practice_threshold_minutes() -> f64 {
    60.0
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            practice_bonus: default_practice_bonus(),
            practice_saturation_hours: default_practice_saturation_hours(),
            tempo_bonus: default_tempo_bonus(),
            tempo_floor_ratio: default_tempo_floor_ratio(),
            concert_urgent_days: default_concert_urgent_days(),
            concert_near_days: default_concert_near_days(),
            consistency_window_days: default_consistency_window_days(),
            empty_practiced_score: default_empty_practiced_score(),
            empty_unpracticed_score: default_empty_unpracticed_score(),
            empty_practice_threshold_minutes: default_empty_practice_threshold_minutes(),
            color_weights: ColorWeights::default(),
        }
    }
}
