//! Due state of spots relative to the current clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::spot::PracticeSpot;

/// Where a spot sits in its review cycle.
///
/// `Fresh -> Scheduled -> Due -> (attempt) -> Scheduled`. A rated attempt
/// always sets a due date, so a spot only stays fresh until its first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueState {
    /// Never scheduled, due now
    Fresh,
    /// Due date in the future
    Scheduled,
    /// Due date reached
    Due,
}

impl DueState {
    pub fn of(spot: &PracticeSpot, now: DateTime<Utc>) -> Self {
        match spot.next_due() {
            None => DueState::Fresh,
            Some(due) if now >= due => DueState::Due,
            Some(_) => DueState::Scheduled,
        }
    }

    /// Whether the spot should be practiced now.
    pub fn is_actionable(self) -> bool {
        !matches!(self, DueState::Scheduled)
    }
}

/// A spot that needs practice now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueSpot {
    pub piece_id: String,
    pub spot_id: String,
    pub state: DueState,
    /// Hours past the due date, `None` for fresh spots.
    pub overdue_hours: Option<f64>,
}

/// Due and fresh spots across pieces, most overdue first, fresh spots last.
pub fn due_spots(pieces: &[Piece], now: DateTime<Utc>) -> Vec<DueSpot> {
    let mut due: Vec<DueSpot> = pieces
        .iter()
        .flat_map(|piece| piece.active_spots().map(move |spot| (piece, spot)))
        .filter_map(|(piece, spot)| {
            let state = DueState::of(spot, now);
            state.is_actionable().then(|| DueSpot {
                piece_id: piece.id.clone(),
                spot_id: spot.id.clone(),
                state,
                overdue_hours: spot
                    .next_due()
                    .map(|d| (now - d).num_seconds() as f64 / 3600.0),
            })
        })
        .collect();

    due.sort_by(|a, b| {
        let a_key = a.overdue_hours.unwrap_or(f64::NEG_INFINITY);
        let b_key = b.overdue_hours.unwrap_or(f64::NEG_INFINITY);
        b_key
            .total_cmp(&a_key)
            .then_with(|| a.piece_id.cmp(&b.piece_id))
            .then_with(|| a.spot_id.cmp(&b.spot_id))
    });
    due
}
