//! Readiness score for a single spot.

use chrono::{DateTime, Utc};

use super::factors::{
    consistency_multiplier, difficulty_multiplier, overdue_multiplier, success_rate,
};
use crate::spot::PracticeSpot;

/// Attempts considered for the recency reweighting.
const RECENT_WINDOW: usize = 5;

/// Scores a spot from its rated history and due state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpotReadinessScorer;

impl SpotReadinessScorer {
    pub fn new() -> Self {
        Self
    }

    /// Readiness in [0, 100].
    ///
    /// `difficulty` is the declared difficulty (1-5) of the parent piece.
    /// Spots without rated attempts score 0.
    pub fn score(&self, spot: &PracticeSpot, difficulty: u8, now: DateTime<Utc>) -> f64 {
        let mut rated: Vec<(DateTime<Utc>, bool)> = spot
            .history
            .iter()
            .filter_map(|a| a.outcome().map(|ok| (a.timestamp, ok)))
            .collect();
        rated.sort_by(|a, b| b.0.cmp(&a.0));
        let outcomes: Vec<bool> = rated.into_iter().map(|(_, ok)| ok).collect();

        let Some(overall) = success_rate(&outcomes) else {
            return 0.0;
        };

        let mut base = 100.0 * overall;
        if outcomes.len() >= 3 {
            let recent = &outcomes[..outcomes.len().min(RECENT_WINDOW)];
            let recent_rate = success_rate(recent).unwrap_or(overall);
            base = 0.6 * base + 0.4 * (100.0 * recent_rate);
        }

        let consistency = consistency_multiplier(&outcomes);
        let overdue = overdue_multiplier(spot.next_due(), now);
        let difficulty = difficulty_multiplier(difficulty);
        let score = (base * consistency * overdue * difficulty).clamp(0.0, 100.0);

        tracing::debug!(
            spot = %spot.id,
            base,
            consistency,
            overdue,
            difficulty,
            score,
            "spot readiness"
        );
        score
    }
}
