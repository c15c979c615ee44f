//! # Etude Core Library
//!
//! This library provides the scheduling and readiness engine behind Etude,
//! a practice planner for instrumentalists. Musicians mark trouble spots in a
//! score and log every attempt with a 1-5 quality rating; the engine decides
//! when each spot is next due and how ready spots, pieces and whole concert
//! programs are.
//!
//! ## Architecture
//!
//! - **Scheduler**: SM-2 style spaced repetition, one pure update per attempt
//! - **Readiness**: spot scores from rated history, piece scores from
//!   color-weighted spot scores and practice multipliers
//! - **Priority**: "what to practice now" ranking of pieces and spots
//! - **Planner**: project reports with feasibility against a daily goal
//! - **Storage**: TOML configuration and the JSON library snapshot
//!
//! All computations are synchronous and take the current time as an
//! argument, so results are reproducible.
//!
//! ## Key Components
//!
//! - [`SpotScheduler`]: next-due computation after an attempt
//! - [`SpotReadinessScorer`]: 0-100 score for one spot
//! - [`PieceReadinessAggregator`]: 0-100 score for a piece
//! - [`PracticePriorityRanker`]: practice-order ranking
//! - [`ProjectReadinessPlanner`]: project readiness report

pub mod error;
pub mod piece;
pub mod planner;
pub mod priority;
pub mod project;
pub mod readiness;
pub mod scheduler;
pub mod spot;
pub mod storage;

pub use error::{ConfigError, CoreError, ValidationError};
pub use piece::Piece;
pub use planner::{PieceReadiness, PlannerConfig, ProjectReadinessPlanner, ProjectReadinessReport};
pub use priority::{PracticePriorityRanker, PriorityConfig, RankedPiece, RankedSpot};
pub use project::Project;
pub use readiness::{
    ColorWeights, PieceReadinessAggregator, PieceReadinessBreakdown, ReadinessConfig,
    ReadinessLevel, SpotReadinessScorer,
};
pub use scheduler::{due_spots, DueSpot, DueState, ScheduleOutcome, SchedulerConfig, SpotScheduler};
pub use spot::{
    PracticeAttempt, PracticeSpot, Quality, SpotBounds, SpotColor, SpotPriority, SrsState,
};
pub use storage::{Config, Library};
