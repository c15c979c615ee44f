//! Projects group pieces toward a concert or audition.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named set of piece references with a practice goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Piece ids; a piece may belong to several projects.
    #[serde(default)]
    pub piece_ids: Vec<String>,
    #[serde(default)]
    pub concert_date: Option<NaiveDate>,
    /// Daily practice-time goal in minutes.
    #[serde(default = "default_daily_goal")]
    pub daily_goal_minutes: u32,
    pub created_at: DateTime<Utc>,
}

fn default_daily_goal() -> u32 {
    30
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            piece_ids: Vec::new(),
            concert_date: None,
            daily_goal_minutes: default_daily_goal(),
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_pieces<I, S>(mut self, piece_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in piece_ids {
            let id = id.into();
            if !self.piece_ids.contains(&id) {
                self.piece_ids.push(id);
            }
        }
        self
    }

    pub fn with_concert_date(mut self, date: NaiveDate) -> Self {
        self.concert_date = Some(date);
        self
    }

    pub fn with_daily_goal(mut self, minutes: u32) -> Self {
        self.daily_goal_minutes = minutes;
        self
    }

    pub fn includes(&self, piece_id: &str) -> bool {
        self.piece_ids.iter().any(|id| id == piece_id)
    }
}
