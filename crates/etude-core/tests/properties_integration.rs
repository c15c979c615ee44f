//! Property tests for the scheduler and scorers.

use chrono::{DateTime, Duration, TimeZone, Utc};
use etude_core::{
    Piece, PieceReadinessAggregator, PracticeAttempt, PracticeSpot, SpotBounds, SpotColor,
    SpotReadinessScorer, SpotScheduler, SrsState,
};
use etude_core::spot::MIN_EASE_FACTOR;
use proptest::prelude::*;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
}

fn blank_spot(color: SpotColor) -> PracticeSpot {
    PracticeSpot::new(1, SpotBounds::new(0.0, 0.0, 0.5, 0.5).unwrap(), color)
        .unwrap()
        .with_id("spot")
}

/// Feed `qualities` through the scheduler one day apart.
fn replay(qualities: &[u8]) -> PracticeSpot {
    let scheduler = SpotScheduler::new();
    let mut spot = blank_spot(SpotColor::Red);
    for (i, q) in qualities.iter().enumerate() {
        let at = base_time() + Duration::days(i as i64);
        let attempt = PracticeAttempt::new("spot", at, 10.0, Some(*q)).unwrap();
        let outcome = scheduler.schedule(&spot, &attempt).unwrap();
        spot.record(attempt, &outcome);
    }
    spot
}

fn color() -> impl Strategy<Value = SpotColor> {
    prop_oneof![
        Just(SpotColor::Red),
        Just(SpotColor::Yellow),
        Just(SpotColor::Green)
    ]
}

proptest! {
    #[test]
    fn failure_always_resets(history in prop::collection::vec(1u8..=5, 0..20), fail in 1u8..=2) {
        let spot = replay(&history);
        let attempt = PracticeAttempt::new("spot", base_time() + Duration::days(40), 5.0, Some(fail)).unwrap();
        let srs = SpotScheduler::new().schedule(&spot, &attempt).unwrap().srs.unwrap();
        prop_assert_eq!(srs.repetitions(), 0);
        prop_assert_eq!(srs.interval_days(), 1);
    }

    #[test]
    fn interval_never_shrinks_on_success_after_third_repetition(
        ease in 1.3f64..3.5,
        interval in 1u32..400,
        reps in 2u32..30,
        quality in 3u8..=5,
    ) {
        let spot = blank_spot(SpotColor::Yellow).with_srs(SrsState::new(ease, interval, reps, None).unwrap());
        let attempt = PracticeAttempt::new("spot", base_time(), 5.0, Some(quality)).unwrap();
        let srs = SpotScheduler::new().schedule(&spot, &attempt).unwrap().srs.unwrap();
        prop_assert!(srs.repetitions() >= 3);
        prop_assert!(srs.interval_days() >= interval);
    }

    #[test]
    fn ease_never_drops_below_floor(history in prop::collection::vec(1u8..=5, 1..60)) {
        let spot = replay(&history);
        let srs = spot.srs().unwrap();
        prop_assert!(srs.ease_factor() >= MIN_EASE_FACTOR);
        prop_assert!(srs.interval_days() >= 1);
        prop_assert!((0.0..=100.0).contains(&spot.cached_readiness()));
    }

    #[test]
    fn spot_score_is_bounded_and_idempotent(
        qualities in prop::collection::vec(prop::option::of(1u8..=5), 0..50),
        difficulty in 1u8..=5,
        hours_later in 0i64..2000,
    ) {
        let history = qualities
            .iter()
            .enumerate()
            .map(|(i, q)| PracticeAttempt::new("spot", base_time() + Duration::hours(i as i64), 3.0, *q).unwrap())
            .collect();
        let spot = blank_spot(SpotColor::Red)
            .with_history(history)
            .with_srs(SrsState::new(2.5, 1, 1, Some(base_time())).unwrap());
        let now = base_time() + Duration::hours(hours_later);

        let scorer = SpotReadinessScorer::new();
        let first = scorer.score(&spot, difficulty, now);
        let second = scorer.score(&spot, difficulty, now);
        prop_assert!((0.0..=100.0).contains(&first));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn piece_score_is_bounded(
        colors in prop::collection::vec(color(), 0..8),
        minutes in 0.0f64..5000.0,
        target in 40.0f64..200.0,
        current in 1.0f64..250.0,
        difficulty in 1u8..=5,
    ) {
        let mut piece = Piece::new("Property")
            .with_practice_minutes(minutes)
            .with_tempo(target, current)
            .unwrap()
            .with_difficulty(difficulty)
            .unwrap();
        for (i, color) in colors.into_iter().enumerate() {
            let id = format!("s{i}");
            let attempts = (0..5)
                .map(|d| PracticeAttempt::new(id.clone(), base_time() - Duration::days(d), 5.0, Some(1 + (i as u8 + d as u8) % 5)).unwrap())
                .collect();
            let spot = blank_spot(color).with_id(id).with_history(attempts);
            piece.add_spot(spot).unwrap();
        }
        let score = PieceReadinessAggregator::new().score(&piece, None, base_time());
        prop_assert!((0.0..=100.0).contains(&score));
    }
}

#[test]
fn fifty_failures_keep_everything_in_bounds() {
    let spot = replay(&[1; 50]);
    let srs = spot.srs().unwrap();
    assert_eq!(srs.ease_factor(), 2.5);
    assert_eq!(srs.repetitions(), 0);
    assert_eq!(spot.cached_readiness(), 0.0);
    let score = SpotReadinessScorer::new().score(&spot, 5, base_time() + Duration::days(60));
    assert_eq!(score, 0.0);
}
