//! Project readiness planning.
//!
//! Rolls the pieces of a project into one report: overall score and level,
//! per-piece scores, estimated practice time to reach the target readiness,
//! whether that time fits the daily goal before the concert, and rule-based
//! recommendations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::piece::Piece;
use crate::project::Project;
use crate::readiness::factors::days_until;
use crate::readiness::{PieceReadinessAggregator, ReadinessConfig, ReadinessLevel};
use crate::spot::SpotColor;

/// Planner tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Readiness each piece should reach
    #[serde(default = "default_target_readiness")]
    pub target_readiness: f64,
    /// Planning horizon without a concert date
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: i64,
    /// Minutes per readiness point, indexed by difficulty 1-5
    #[serde(default = "default_minutes_per_point")]
    pub minutes_per_point: [f64; 5],
    /// Cost weight of points above 50
    #[serde(default = "default_above_half_weight")]
    pub above_half_weight: f64,
    /// Pieces below this score are named in recommendations
    #[serde(default = "default_weak_piece_threshold")]
    pub weak_piece_threshold: f64,
    #[serde(default = "default_max_named_pieces")]
    pub max_named_pieces: usize,
    /// Critical spot count above which a recommendation is added
    #[serde(default = "default_critical_spot_threshold")]
    pub critical_spot_threshold: usize,
}

fn default_target_readiness() -> f64 {
    85.0
}
fn default_horizon_days() -> i64 {
    365
}
fn default_minutes_per_point() -> [f64; 5] {
    [1.0, 1.75, 2.5, 3.25, 4.0]
}
fn default_above_half_weight() -> f64 {
    2.0
}
fn default_weak_piece_threshold() -> f64 {
    60.0
}
fn default_max_named_pieces() -> usize {
    3
}
fn default_critical_spot_threshold() -> usize {
    10
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            target_readiness: default_target_readiness(),
            default_horizon_days: default_horizon_days(),
            minutes_per_point: default_minutes_per_point(),
            above_half_weight: default_above_half_weight(),
            weak_piece_threshold: default_weak_piece_threshold(),
            max_named_pieces: default_max_named_pieces(),
            critical_spot_threshold: default_critical_spot_threshold(),
        }
    }
}

/// Readiness of one piece within a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieceReadiness {
    pub piece_id: String,
    pub title: String,
    pub score: f64,
    pub level: ReadinessLevel,
    /// Estimated practice minutes to reach the target readiness
    pub minutes_needed: f64,
}

/// Project-level readiness report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectReadinessReport {
    pub project_id: String,
    pub overall_score: f64,
    pub level: ReadinessLevel,
    pub per_piece_scores: Vec<PieceReadiness>,
    pub recommendations: Vec<String>,
    pub time_needed_minutes: f64,
    pub available_minutes: f64,
    /// `None` when the project has no concert date
    pub days_until_concert: Option<i64>,
    pub feasible: bool,
}

/// Builds project readiness reports.
#[derive(Debug, Clone, Default)]
pub struct ProjectReadinessPlanner {
    config: PlannerConfig,
    aggregator: PieceReadinessAggregator,
}

impl ProjectReadinessPlanner {
    /// Create a planner with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: PlannerConfig, readiness: ReadinessConfig) -> Self {
        Self {
            config,
            aggregator: PieceReadinessAggregator::with_config(readiness),
        }
    }

    /// Estimated minutes to raise `score` to the target readiness.
    ///
    /// Points above 50 cost `above_half_weight` times as much.
    pub fn minutes_to_target(&self, score: f64, difficulty: u8) -> f64 {
        let rate = self.config.minutes_per_point[usize::from(difficulty.clamp(1, 5) - 1)];
        let target = self.config.target_readiness;
        let below_half = (target.min(50.0) - score).max(0.0);
        let above_half = (target - score.max(50.0)).max(0.0);
        rate * (below_half + self.config.above_half_weight * above_half)
    }

    /// Plan the project. Pieces not referenced by the project are ignored.
    pub fn plan(&self, project: &Project, pieces: &[Piece], now: DateTime<Utc>) -> ProjectReadinessReport {
        let selected: Vec<&Piece> = pieces.iter().filter(|p| project.includes(&p.id)).collect();
        if selected.len() < project.piece_ids.len() {
            tracing::debug!(
                project = %project.id,
                referenced = project.piece_ids.len(),
                found = selected.len(),
                "some project pieces were not supplied"
            );
        }

        let days_until_concert = project.concert_date.map(|d| days_until(d, now));

        if selected.is_empty() {
            return ProjectReadinessReport {
                project_id: project.id.clone(),
                overall_score: 0.0,
                level: ReadinessLevel::NotReady,
                per_piece_scores: Vec::new(),
                recommendations: vec![
                    "Add pieces to this project to start tracking readiness.".to_string(),
                ],
                time_needed_minutes: 0.0,
                available_minutes: 0.0,
                days_until_concert,
                feasible: false,
            };
        }

        let per_piece_scores: Vec<PieceReadiness> = selected
            .iter()
            .map(|piece| {
                let score = self.aggregator.score(piece, project.concert_date, now);
                PieceReadiness {
                    piece_id: piece.id.clone(),
                    title: piece.title.clone(),
                    score,
                    level: ReadinessLevel::from_score(score),
                    minutes_needed: self.minutes_to_target(score, piece.difficulty),
                }
            })
            .collect();

        let overall_score = per_piece_scores.iter().map(|p| p.score).sum::<f64>()
            / per_piece_scores.len() as f64;
        let time_needed_minutes: f64 = per_piece_scores.iter().map(|p| p.minutes_needed).sum();
        let horizon = days_until_concert.unwrap_or(self.config.default_horizon_days).max(0);
        let available_minutes = f64::from(project.daily_goal_minutes) * horizon as f64;
        let feasible = time_needed_minutes <= available_minutes;

        let critical_spots = selected
            .iter()
            .flat_map(|p| p.active_spots())
            .filter(|s| s.color == SpotColor::Red)
            .count();

        let mut report = ProjectReadinessReport {
            project_id: project.id.clone(),
            overall_score,
            level: ReadinessLevel::from_score(overall_score),
            per_piece_scores,
            recommendations: Vec::new(),
            time_needed_minutes,
            available_minutes,
            days_until_concert,
            feasible,
        };
        report.recommendations = self.recommendations(&report, critical_spots);
        report
    }

    fn recommendations(&self, report: &ProjectReadinessReport, critical_spots: usize) -> Vec<String> {
        let mut out = Vec::new();

        out.push(
            match report.overall_score {
                s if s < 50.0 => "Focus on fundamentals: work slowly through the critical spots every day.",
                s if s < 75.0 => "Steady progress: prioritize red spots and raise tempo gradually.",
                s if s < 90.0 => "Nearly there: polish transitions and practice full run-throughs.",
                _ => "Performance ready: keep pieces fresh with light daily review.",
            }
            .to_string(),
        );

        match report.days_until_concert {
            Some(days) if days <= 0 => out.push(
                "URGENT: the concert date has arrived. Warm up calmly and trust your preparation."
                    .to_string(),
            ),
            Some(days) if days <= 7 => out.push(format!(
                "URGENT: concert in {days} days. Run full performances daily and stop adding new material."
            )),
            Some(days) if days <= 30 => out.push(format!(
                "Concert in {days} days: schedule mock performances and focus on the weakest pieces."
            )),
            _ => {}
        }

        let mut weak: Vec<&PieceReadiness> = report
            .per_piece_scores
            .iter()
            .filter(|p| p.score < self.config.weak_piece_threshold)
            .collect();
        weak.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.title.cmp(&b.title)));
        if !weak.is_empty() {
            let names: Vec<String> = weak
                .iter()
                .take(self.config.max_named_pieces)
                .map(|p| format!("{} ({:.0}%)", p.title, p.score))
                .collect();
            out.push(format!("Needs attention: {}.", names.join(", ")));
        }

        if critical_spots > self.config.critical_spot_threshold {
            out.push(format!(
                "{critical_spots} critical spots remain. Work through them in short, focused sessions."
            ));
        }

        if !report.feasible {
            out.push(format!(
                "Daily goal is not enough: about {:.0} minutes needed, {:.0} available. Consider raising the daily goal.",
                report.time_needed_minutes, report.available_minutes
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::{PracticeSpot, SpotBounds};
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn empty_project() {
        let planner = ProjectReadinessPlanner::new();
        let report = planner.plan(&Project::new("Recital"), &[], now());
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.level, ReadinessLevel::NotReady);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].contains("Add pieces"));
        assert!(!report.feasible);
    }

    #[test]
    fn minutes_to_target_doubles_above_half() {
        let planner = ProjectReadinessPlanner::new();
        // 40 -> 85 at difficulty 1: 10 points below 50, 35 above (x2)
        assert_eq!(planner.minutes_to_target(40.0, 1), 80.0);
        assert_eq!(planner.minutes_to_target(60.0, 5), 4.0 * 2.0 * 25.0);
        assert_eq!(planner.minutes_to_target(90.0, 3), 0.0);
    }

    #[test]
    fn plan_without_concert_uses_default_horizon() {
        let planner = ProjectReadinessPlanner::new();
        let piece = Piece::new("Nocturne").with_id("n").with_practice_minutes(10.0);
        let project = Project::new("Recital").with_pieces(["n", "missing"]).with_daily_goal(20);
        let report = planner.plan(&project, &[piece], now());

        assert_eq!(report.per_piece_scores.len(), 1);
        assert_eq!(report.overall_score, 45.0);
        assert_eq!(report.level, ReadinessLevel::Learning);
        assert_eq!(report.available_minutes, 20.0 * 365.0);
        assert!(report.feasible);
        assert!(report.recommendations[0].starts_with("Focus on fundamentals"));
        assert!(report.recommendations.iter().any(|r| r.contains("Nocturne (45%)")));
    }

    #[test]
    fn many_critical_spots_are_flagged() {
        let mut piece = Piece::new("Toccata").with_id("t").with_practice_minutes(10.0);
        for i in 0..11 {
            let spot = PracticeSpot::new(1, SpotBounds::new(0.0, 0.0, 0.1, 0.1).unwrap(), SpotColor::Red)
                .unwrap()
                .with_id(format!("s{i}"));
            piece.add_spot(spot).unwrap();
        }
        let project = Project::new("Recital")
            .with_pieces(["t"])
            .with_concert_date(NaiveDate::from_ymd_opt(2026, 6, 21).unwrap())
            .with_daily_goal(10);
        let report = ProjectReadinessPlanner::new().plan(&project, &[piece], now());

        assert_eq!(report.days_until_concert, Some(20));
        assert!(report.recommendations.iter().any(|r| r.starts_with("11 critical spots")));
        assert!(report.recommendations.iter().any(|r| r.starts_with("Concert in 20 days")));
        // 0 -> 85 at difficulty 3: 2.5 * (50 + 2 * 35) = 300 > 200
        assert!(!report.feasible);
        assert!(report.recommendations.last().unwrap().starts_with("Daily goal is not enough"));
    }
}
