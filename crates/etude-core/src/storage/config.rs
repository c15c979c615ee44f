//! TOML-based engine configuration.
//!
//! Holds every tunable of the engine:
//! - SRS scheduling parameters
//! - Readiness weights, bonuses and concert thresholds
//! - Priority multipliers
//! - Project planning targets and rate table
//!
//! Configuration is stored at `~/.config/etude/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::planner::{PlannerConfig, ProjectReadinessPlanner};
use crate::priority::{PracticePriorityRanker, PriorityConfig};
use crate::readiness::{PieceReadinessAggregator, ReadinessConfig};
use crate::scheduler::{SchedulerConfig, SpotScheduler};

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/etude/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub priority: PriorityConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let load_failed = |message: String| {
            CoreError::Config(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message,
            })
        };
        let raw: toml::Value = toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
        if let Some(key) = non_finite_key(&raw, "") {
            return Err(ConfigError::InvalidValue {
                key,
                message: "must be a finite number".to_string(),
            }
            .into());
        }
        raw.try_into().map_err(|e: toml::de::Error| load_failed(e.to_string()))
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field's type. The config is left unchanged in that case.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    pub fn scheduler(&self) -> SpotScheduler {
        SpotScheduler::with_config(self.scheduler.clone())
    }

    pub fn aggregator(&self) -> PieceReadinessAggregator {
        PieceReadinessAggregator::with_config(self.readiness.clone())
    }

    pub fn ranker(&self) -> PracticePriorityRanker {
        PracticePriorityRanker::with_config(self.priority.clone(), self.readiness.clone())
    }

    pub fn planner(&self) -> ProjectReadinessPlanner {
        ProjectReadinessPlanner::with_config(self.planner.clone(), self.readiness.clone())
    }
}

/// Dot path of the first `nan`/`inf` float in a TOML document.
fn non_finite_key(value: &toml::Value, prefix: &str) -> Option<String> {
    let join = |part: &str| {
        if prefix.is_empty() {
            part.to_string()
        } else {
            format!("{prefix}.{part}")
        }
    };
    match value {
        toml::Value::Float(f) if !f.is_finite() => Some(prefix.to_string()),
        toml::Value::Table(table) => table
            .iter()
            .find_map(|(k, v)| non_finite_key(v, &join(k))),
        toml::Value::Array(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, v)| non_finite_key(v, &join(&i.to_string()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str(indoc! {r#"
            [readiness]
            practice_saturation_hours = 10.0

            [readiness.color_weights]
            red = 4.0
            yellow = 2.0
            green = 1.0

            [planner]
            target_readiness = 90.0
        "#})
        .unwrap();
        assert_eq!(parsed.readiness.practice_saturation_hours, 10.0);
        assert_eq!(parsed.readiness.practice_bonus, 0.3);
        assert_eq!(parsed.readiness.color_weights.red, 4.0);
        assert_eq!(parsed.planner.target_readiness, 90.0);
        assert_eq!(parsed.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("readiness.practice_saturation_hours").as_deref(), Some("6.7"));
        assert_eq!(cfg.get("readiness.color_weights.red").as_deref(), Some("3.0"));
        assert_eq!(cfg.get("planner.default_horizon_days").as_deref(), Some("365"));
        assert!(cfg.get("readiness.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_numbers_and_arrays() {
        let mut cfg = Config::default();
        cfg.set("planner.target_readiness", "90").unwrap();
        cfg.set("readiness.concert_urgent_days", "10").unwrap();
        cfg.set("priority.stale_after_days", "-1").unwrap();
        cfg.set("planner.minutes_per_point", "[1, 2, 3, 4, 5]").unwrap();
        assert_eq!(cfg.planner.target_readiness, 90.0);
        assert_eq!(cfg.readiness.concert_urgent_days, 10);
        assert_eq!(cfg.priority.stale_after_days, -1);
        assert_eq!(cfg.planner.minutes_per_point, [1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("readiness.nonexistent", "1").unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type_and_keeps_config() {
        let mut cfg = Config::default();
        assert!(cfg.set("readiness.practice_bonus", "lots").is_err());
        assert!(cfg.set("scheduler.second_interval_days", "2.5").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("readiness.color_weights.green", "0.5").unwrap();
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.readiness.color_weights.green, 0.5);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "readiness = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            indoc! {r#"
                [readiness]
                practice_bonus = nan
            "#},
        )
        .unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Config(ConfigError::InvalidValue { ref key, .. }) if key == "readiness.practice_bonus"
        ));

        std::fs::write(
            &path,
            indoc! {r#"
                [planner]
                minutes_per_point = [1.0, 2.0, inf, 3.0, 4.0]
            "#},
        )
        .unwrap();
        assert!(Config::load_from(&path).is_err());

        let mut cfg = Config::default();
        for value in ["nan", "inf", "-inf"] {
            assert!(cfg.set("readiness.practice_bonus", value).is_err());
        }
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn engines_pick_up_config() {
        let mut cfg = Config::default();
        cfg.set("scheduler.second_interval_days", "4").unwrap();
        assert_eq!(cfg.scheduler().config().second_interval_days, 4);
        cfg.set("readiness.empty_practiced_score", "80").unwrap();
        assert_eq!(cfg.aggregator().config().empty_practiced_score, 80.0);
    }
}
