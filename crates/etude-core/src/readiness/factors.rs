//! Individual readiness factors.
//!
//! Each function computes one multiplier or ratio in isolation; the spot
//! scorer and piece aggregator compose them.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashSet;

/// Share of successful outcomes, `None` for an empty slice.
pub fn success_rate(outcomes: &[bool]) -> Option<f64> {
    if outcomes.is_empty() {
        return None;
    }
    let successes = outcomes.iter().filter(|&&ok| ok).count();
    Some(successes as f64 / outcomes.len() as f64)
}

/// Population variance of binary outcomes (success = 1, failure = 0).
pub fn outcome_variance(outcomes: &[bool]) -> f64 {
    success_rate(outcomes).map_or(0.0, |p| p * (1.0 - p))
}

/// Consistency multiplier over the most recent ten outcomes.
///
/// `outcomes` must be ordered most recent first. Fewer than three outcomes
/// yield 1.0.
pub fn consistency_multiplier(outcomes: &[bool]) -> f64 {
    if outcomes.len() < 3 {
        return 1.0;
    }
    let window = &outcomes[..outcomes.len().min(10)];
    (1.0 - 0.3 * outcome_variance(window)).max(0.8)
}

/// Penalty for a spot past its due date: 1% per hour, floored at 0.5.
pub fn overdue_multiplier(next_due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match next_due {
        Some(due) if now > due => {
            let hours = (now - due).num_seconds() as f64 / 3600.0;
            (1.0 - 0.01 * hours).max(0.5)
        }
        _ => 1.0,
    }
}

/// Multiplier for the declared difficulty (1-5) of the parent piece.
pub fn difficulty_multiplier(difficulty: u8) -> f64 {
    let clamped = difficulty.clamp(1, 5);
    if clamped != difficulty {
        tracing::warn!(difficulty, "difficulty outside 1-5, clamping");
    }
    match clamped {
        1 => 1.2,
        2 => 1.1,
        3 => 1.0,
        4 => 0.9,
        _ => 0.8,
    }
}

/// Bonus for accumulated practice time, saturating at `saturation_hours`.
pub fn practice_time_multiplier(total_minutes: f64, bonus: f64, saturation_hours: f64) -> f64 {
    if saturation_hours <= 0.0 {
        return 1.0 + bonus;
    }
    let hours = (total_minutes / 60.0).max(0.0);
    1.0 + (hours / saturation_hours).min(1.0) * bonus
}

/// Tempo progress multiplier. Missing or non-positive tempos yield 1.0.
///
/// ```text
/// ratio >= 1.0          -> bonus
/// floor <= ratio < 1.0  -> linear 1.0 .. bonus
/// ratio < floor         -> 0.8 + 0.25 * ratio
/// ```
pub fn tempo_multiplier(
    target_bpm: Option<f64>,
    current_bpm: Option<f64>,
    bonus: f64,
    floor_ratio: f64,
) -> f64 {
    let (Some(target), Some(current)) = (target_bpm, current_bpm) else {
        return 1.0;
    };
    if !(target > 0.0 && current > 0.0 && target.is_finite() && current.is_finite()) {
        tracing::warn!(target, current, "ignoring non-positive tempo");
        return 1.0;
    }

    let ratio = current / target;
    if ratio >= 1.0 {
        bonus
    } else if ratio >= floor_ratio && floor_ratio < 1.0 {
        1.0 + (bonus - 1.0) * (ratio - floor_ratio) / (1.0 - floor_ratio)
    } else {
        0.8 + 0.25 * ratio
    }
}

/// Fraction of the last `window_days` calendar days (today included) with
/// at least one attempt.
pub fn practice_frequency<I>(timestamps: I, now: DateTime<Utc>, window_days: u32) -> f64
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    if window_days == 0 {
        return 0.0;
    }
    let today = now.date_naive();
    let first = today - Duration::days(i64::from(window_days) - 1);
    let days: HashSet<NaiveDate> = timestamps
        .into_iter()
        .map(|ts| ts.date_naive())
        .filter(|day| *day >= first && *day <= today)
        .collect();
    days.len() as f64 / f64::from(window_days)
}

/// Multiplier for recent practice consistency: 0.7 .. 1.3.
pub fn recent_consistency_multiplier(frequency: f64) -> f64 {
    0.7 + 0.6 * frequency.clamp(0.0, 1.0)
}

/// Whole calendar days from `now` until `date`; negative once it passed.
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    (date - now.date_naive()).num_days()
}

/// Pressure from an approaching concert. No concert yields 1.0.
pub fn concert_pressure_multiplier(days_until: Option<i64>, urgent_days: i64, near_days: i64) -> f64 {
    match days_until {
        None => 1.0,
        Some(d) if d <= 0 => 0.5,
        Some(d) if d <= urgent_days => 0.7,
        Some(d) if d <= near_days => 0.85,
        Some(_) => 1.0,
    }
}
