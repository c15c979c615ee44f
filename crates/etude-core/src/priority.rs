//! Practice priority ranking.
//!
//! Answers "what should I practice now?" for pieces and spots. Priority is
//! inverted readiness scaled by:
//! - Concert proximity (closer = higher priority)
//! - Focus tags chosen for the session
//! - Time since the piece was last practiced
//!
//! Ranking only reads pieces; it never mutates state.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::readiness::factors::days_until;
use crate::readiness::{PieceReadinessAggregator, ReadinessConfig, SpotReadinessScorer};
use crate::scheduler::DueState;
use crate::spot::SpotColor;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Priority multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// Multiplier when the concert is within the urgent window (default 1.5)
    #[serde(default = "default_urgent_multiplier")]
    pub urgent_multiplier: f64,
    /// Multiplier when the concert is within the near window (default 1.2)
    #[serde(default = "default_near_multiplier")]
    pub near_multiplier: f64,
    /// Multiplier for pieces carrying a focus tag (default 1.3)
    #[serde(default = "default_focus_tag_multiplier")]
    pub focus_tag_multiplier: f64,
    /// Days without practice before the staleness boost kicks in
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,
    /// Boost per day without practice (default 0.1)
    #[serde(default = "default_staleness_per_day")]
    pub staleness_per_day: f64,
    /// Days assumed for pieces that were never practiced
    #[serde(default = "default_never_practiced_days")]
    pub never_practiced_days: i64,
}

fn default_urgent_multiplier() -> f64 {
    1.5
}
fn default_near_multiplier() -> f64 {
    1.2
}
fn default_focus_tag_multiplier() -> f64 {
    1.3
}
fn default_stale_after_days() -> i64 {
    3
}
fn default_staleness_per_day() -> f64 {
    0.1
}
fn default_never_practiced_days() -> i64 {
    999
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            urgent_multiplier: default_urgent_multiplier(),
            near_multiplier: default_near_multiplier(),
            focus_tag_multiplier: default_focus_tag_multiplier(),
            stale_after_days: default_stale_after_days(),
            staleness_per_day: default_staleness_per_day(),
            never_practiced_days: default_never_practiced_days(),
        }
    }
}

/// A piece with its computed priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPiece {
    pub piece_id: String,
    pub title: String,
    pub readiness: f64,
    pub priority: f64,
}

/// A spot with its computed priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSpot {
    pub piece_id: String,
    pub spot_id: String,
    pub color: SpotColor,
    pub state: DueState,
    pub readiness: f64,
    pub priority: f64,
}

/// Ranks pieces and spots for a practice session.
#[derive(Debug, Clone, Default)]
pub struct PracticePriorityRanker {
    config: PriorityConfig,
    aggregator: PieceReadinessAggregator,
}

impl PracticePriorityRanker {
    /// Create a ranker with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: PriorityConfig, readiness: ReadinessConfig) -> Self {
        Self {
            config,
            aggregator: PieceReadinessAggregator::with_config(readiness),
        }
    }

    /// Priority of a piece; higher means practice sooner.
    pub fn priority(
        &self,
        piece: &Piece,
        concert_date: Option<NaiveDate>,
        focus_tags: &[String],
        now: DateTime<Utc>,
    ) -> f64 {
        let readiness = self.aggregator.score(piece, concert_date, now);
        self.priority_from_readiness(piece, readiness, concert_date, focus_tags, now)
    }

    fn priority_from_readiness(
        &self,
        piece: &Piece,
        readiness: f64,
        concert_date: Option<NaiveDate>,
        focus_tags: &[String],
        now: DateTime<Utc>,
    ) -> f64 {
        let mut priority = 100.0 - readiness;
        priority *= self.concert_factor(piece, concert_date, now);

        if piece.has_any_tag(focus_tags) {
            priority *= self.config.focus_tag_multiplier;
        }

        let idle = piece
            .last_practiced()
            .map_or(days(self.config.never_practiced_days), |last| now - last);
        if idle > days(self.config.stale_after_days) {
            let idle_days = idle.num_seconds() as f64 / SECONDS_PER_DAY;
            priority *= 1.0 + self.config.staleness_per_day * idle_days;
        }

        priority
    }

    /// Concert-proximity multiplier for a piece.
    fn concert_factor(&self, piece: &Piece, concert_date: Option<NaiveDate>, now: DateTime<Utc>) -> f64 {
        let readiness = self.aggregator.config();
        match concert_date.or(piece.concert_date).map(|d| days_until(d, now)) {
            Some(days) if days <= readiness.concert_urgent_days => self.config.urgent_multiplier,
            Some(days) if days <= readiness.concert_near_days => self.config.near_multiplier,
            _ => 1.0,
        }
    }

    /// Pieces ordered by priority, highest first. Ties break on piece id.
    pub fn rank_pieces(
        &self,
        pieces: &[Piece],
        focus_tags: &[String],
        now: DateTime<Utc>,
    ) -> Vec<RankedPiece> {
        let mut ranked: Vec<RankedPiece> = pieces
            .iter()
            .map(|piece| {
                let readiness = self.aggregator.score(piece, None, now);
                RankedPiece {
                    piece_id: piece.id.clone(),
                    title: piece.title.clone(),
                    readiness,
                    priority: self.priority_from_readiness(piece, readiness, None, focus_tags, now),
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.priority
                .total_cmp(&a.priority)
                .then_with(|| a.piece_id.cmp(&b.piece_id))
        });
        ranked
    }

    /// Spots across pieces for a session.
    ///
    /// Spots that are due or fresh come first; within each group the order
    /// is `(100 - spot readiness) x color weight x concert factor`, with the
    /// focus-tag multiplier applied to spots of tagged pieces.
    pub fn rank_spots(
        &self,
        pieces: &[Piece],
        focus_tags: &[String],
        now: DateTime<Utc>,
    ) -> Vec<RankedSpot> {
        let scorer = SpotReadinessScorer::new();
        let weights = self.aggregator.config().color_weights;

        let mut ranked: Vec<RankedSpot> = pieces
            .iter()
            .flat_map(|piece| {
                let concert = self.concert_factor(piece, None, now);
                let focus = if piece.has_any_tag(focus_tags) {
                    self.config.focus_tag_multiplier
                } else {
                    1.0
                };
                piece.active_spots().map(move |spot| {
                    let readiness = scorer.score(spot, piece.difficulty, now);
                    RankedSpot {
                        piece_id: piece.id.clone(),
                        spot_id: spot.id.clone(),
                        color: spot.color,
                        state: DueState::of(spot, now),
                        readiness,
                        priority: (100.0 - readiness) * weights.weight(spot.color) * concert * focus,
                    }
                })
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.state
                .is_actionable()
                .cmp(&a.state.is_actionable())
                .then_with(|| b.priority.total_cmp(&a.priority))
                .then_with(|| a.piece_id.cmp(&b.piece_id))
                .then_with(|| a.spot_id.cmp(&b.spot_id))
        });
        ranked
    }
}

/// Whole-day duration, saturating for out-of-range configured values.
fn days(n: i64) -> Duration {
    Duration::try_days(n).unwrap_or(if n < 0 { Duration::MIN } else { Duration::MAX })
}
