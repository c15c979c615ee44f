//! Piece readiness: weighted spot scores times practice multipliers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::factors::{
    concert_pressure_multiplier, days_until, practice_frequency, practice_time_multiplier,
    recent_consistency_multiplier, tempo_multiplier,
};
use super::{ReadinessConfig, ReadinessLevel, SpotReadinessScorer};
use crate::piece::Piece;

/// Every factor that went into a piece score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieceReadinessBreakdown {
    pub piece_id: String,
    /// Active spots that were scored
    pub spot_count: usize,
    /// Color-weighted mean of spot scores, or the empty-piece baseline
    pub weighted_mean: f64,
    pub practice_time: f64,
    pub tempo: f64,
    pub consistency: f64,
    pub concert_pressure: f64,
    /// Final score in [0, 100]
    pub score: f64,
    pub level: ReadinessLevel,
}

/// Combines spot scores and piece-level signals into one score.
#[derive(Debug, Clone, Default)]
pub struct PieceReadinessAggregator {
    config: ReadinessConfig,
    scorer: SpotReadinessScorer,
}

impl PieceReadinessAggregator {
    /// Create an aggregator with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: ReadinessConfig) -> Self {
        Self {
            config,
            scorer: SpotReadinessScorer::new(),
        }
    }

    pub fn config(&self) -> &ReadinessConfig {
        &self.config
    }

    /// Piece readiness in [0, 100].
    ///
    /// `concert_date` overrides the piece's own date when given.
    pub fn score(&self, piece: &Piece, concert_date: Option<NaiveDate>, now: DateTime<Utc>) -> f64 {
        self.breakdown(piece, concert_date, now).score
    }

    /// Scores of active spots, keyed by spot id.
    pub fn spot_scores(&self, piece: &Piece, now: DateTime<Utc>) -> Vec<(String, f64)> {
        piece
            .active_spots()
            .map(|spot| (spot.id.clone(), self.scorer.score(spot, piece.difficulty, now)))
            .collect()
    }

    pub fn breakdown(
        &self,
        piece: &Piece,
        concert_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> PieceReadinessBreakdown {
        let cfg = &self.config;
        let spots: Vec<_> = piece.active_spots().collect();

        if spots.is_empty() {
            let baseline = if piece.total_practice_minutes > cfg.empty_practice_threshold_minutes {
                cfg.empty_practiced_score
            } else {
                cfg.empty_unpracticed_score
            };
            let score = baseline.clamp(0.0, 100.0);
            return PieceReadinessBreakdown {
                piece_id: piece.id.clone(),
                spot_count: 0,
                weighted_mean: baseline,
                practice_time: 1.0,
                tempo: 1.0,
                consistency: 1.0,
                concert_pressure: 1.0,
                score,
                level: ReadinessLevel::from_score(score),
            };
        }

        let (weighted_sum, weight_total) = spots.iter().fold((0.0, 0.0), |(sum, total), spot| {
            let weight = cfg.color_weights.weight(spot.color).max(0.0);
            let score = self.scorer.score(spot, piece.difficulty, now);
            (sum + weight * score, total + weight)
        });
        let weighted_mean = if weight_total > 0.0 {
            weighted_sum / weight_total
        } else {
            tracing::warn!(piece = %piece.id, "all color weights are zero, using plain mean");
            let scores = self.spot_scores(piece, now);
            scores.iter().map(|(_, s)| s).sum::<f64>() / scores.len() as f64
        };

        let practice_time = practice_time_multiplier(
            piece.total_practice_minutes,
            cfg.practice_bonus,
            cfg.practice_saturation_hours,
        );
        let tempo = tempo_multiplier(
            piece.target_tempo,
            piece.current_tempo,
            cfg.tempo_bonus,
            cfg.tempo_floor_ratio,
        );
        let frequency = practice_frequency(
            spots.iter().flat_map(|s| s.history.iter().map(|a| a.timestamp)),
            now,
            cfg.consistency_window_days,
        );
        let consistency = recent_consistency_multiplier(frequency);
        let concert_pressure = concert_pressure_multiplier(
            concert_date.or(piece.concert_date).map(|d| days_until(d, now)),
            cfg.concert_urgent_days,
            cfg.concert_near_days,
        );

        let score = (weighted_mean * practice_time * tempo * consistency * concert_pressure)
            .clamp(0.0, 100.0);

        tracing::debug!(
            piece = %piece.id,
            weighted_mean,
            practice_time,
            tempo,
            consistency,
            concert_pressure,
            score,
            "piece readiness"
        );

        PieceReadinessBreakdown {
            piece_id: piece.id.clone(),
            spot_count: spots.len(),
            weighted_mean,
            practice_time,
            tempo,
            consistency,
            concert_pressure,
            score,
            level: ReadinessLevel::from_score(score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::{PracticeAttempt, PracticeSpot, SpotBounds, SpotColor};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn spot(id: &str, color: SpotColor, qualities: &[u8], start: DateTime<Utc>) -> PracticeSpot {
        let history = qualities
            .iter()
            .enumerate()
            .map(|(i, q)| {
                PracticeAttempt::new(id, start + Duration::minutes(i as i64), 5.0, Some(*q)).unwrap()
            })
            .collect();
        PracticeSpot::new(1, SpotBounds::new(0.0, 0.0, 0.1, 0.1).unwrap(), color)
            .unwrap()
            .with_id(id)
            .with_history(history)
    }

    #[test]
    fn empty_piece_baselines() {
        let agg = PieceReadinessAggregator::new();
        let practiced = Piece::new("Sonata").with_practice_minutes(90.0);
        assert_eq!(agg.score(&practiced, None, now()), 85.0);
        let barely = Piece::new("Sonata").with_practice_minutes(60.0);
        assert_eq!(agg.score(&barely, None, now()), 45.0);
    }

    #[test]
    fn weighted_mean_uses_color_weights() {
        // red: S F -> 50; green: S S -> 100. Weighted (50*3 + 100)/4 = 62.5
        let start = now() - Duration::days(30);
        let piece = Piece::new("Sonata")
            .with_spot(spot("r", SpotColor::Red, &[5, 1], start))
            .unwrap()
            .with_spot(spot("g", SpotColor::Green, &[4, 4], start))
            .unwrap();
        let b = PieceReadinessAggregator::new().breakdown(&piece, None, now());
        assert!((b.weighted_mean - 62.5).abs() < 1e-9);
        assert_eq!(b.practice_time, 1.0);
        assert_eq!(b.tempo, 1.0);
        assert!((b.consistency - 0.7).abs() < 1e-9);
        assert_eq!(b.concert_pressure, 1.0);
        assert!((b.score - 62.5 * 0.7).abs() < 1e-9);
        assert_eq!(b.spot_count, 2);
    }

    #[test]
    fn deleted_spots_are_ignored() {
        let start = now() - Duration::days(30);
        let mut piece = Piece::new("Sonata")
            .with_spot(spot("r", SpotColor::Red, &[1, 1], start))
            .unwrap()
            .with_spot(spot("g", SpotColor::Green, &[4, 4], start))
            .unwrap();
        piece.spot_mut("r").unwrap().soft_delete(now());
        let b = PieceReadinessAggregator::new().breakdown(&piece, None, now());
        assert_eq!(b.spot_count, 1);
        assert!((b.weighted_mean - 100.0).abs() < 1e-9);
    }

    #[test]
    fn concert_argument_overrides_piece_date() {
        let start = now() - Duration::days(30);
        let piece = Piece::new("Sonata")
            .with_concert_date(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap())
            .with_spot(spot("g", SpotColor::Green, &[4, 4], start))
            .unwrap();
        let agg = PieceReadinessAggregator::new();
        assert_eq!(agg.breakdown(&piece, None, now()).concert_pressure, 1.0);
        let soon = NaiveDate::from_ymd_opt(2026, 6, 4).unwrap();
        assert_eq!(agg.breakdown(&piece, Some(soon), now()).concert_pressure, 0.7);
    }

    #[test]
    fn daily_practice_and_tempo_raise_score() {
        let spots: Vec<_> = (0..7)
            .map(|d| now() - Duration::days(d))
            .collect();
        let history = spots
            .iter()
            .map(|ts| PracticeAttempt::new("g", *ts, 5.0, Some(4)).unwrap())
            .collect();
        let spot = PracticeSpot::new(1, SpotBounds::new(0.0, 0.0, 0.1, 0.1).unwrap(), SpotColor::Green)
            .unwrap()
            .with_id("g")
            .with_history(history);
        let piece = Piece::new("Sonata")
            .with_practice_minutes(402.0)
            .with_tempo(100.0, 100.0)
            .unwrap()
            .with_spot(spot)
            .unwrap();
        let b = PieceReadinessAggregator::new().breakdown(&piece, None, now());
        assert!((b.consistency - 1.3).abs() < 1e-9);
        assert!((b.practice_time - 1.3).abs() < 1e-9);
        assert_eq!(b.tempo, 1.2);
        assert_eq!(b.score, 100.0);
        assert_eq!(b.level, ReadinessLevel::PerformanceReady);
    }
}
