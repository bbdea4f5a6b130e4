// src/config.rs
//! Runtime configuration (document sources, per-source caps, output paths)
//! and the grading tables (recency thresholds + per-category weights).
//!
//! Resolution order for the runtime config: explicit path → the
//! `DEAL_RADAR_CONFIG` env var → `config/radar.toml` → embedded default.
//! The grading tables follow the same pattern via `grading_path`.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::deal::DealCategory;

pub const ENV_CONFIG_PATH: &str = "DEAL_RADAR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/radar.toml";

const DEFAULT_RADAR_TOML: &str = include_str!("../config/radar.toml");
const DEFAULT_GRADING_JSON: &str = include_str!("../config/grading.json");

/// One named document source and the feed it is fetched from.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub feed_url: String,
}

/// Top-level runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RadarConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Max documents taken per source when running in limited mode.
    #[serde(default = "default_limited_cap")]
    pub limited_cap: usize,
    /// Optional override for the embedded lexicon tables.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
    /// Optional override for the embedded grading tables.
    #[serde(default)]
    pub grading_path: Option<PathBuf>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/deal_records.json")
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/broadcaster_grades.json")
}

fn default_limited_cap() -> usize {
    5
}

impl RadarConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing radar config toml")
    }

    /// Resolve and load the runtime config. An explicit or env-provided path
    /// that cannot be read is a hard error; with neither set, a missing
    /// `config/radar.toml` falls back to the embedded default.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            let content = fs::read_to_string(p)
                .with_context(|| format!("reading radar config from {}", p.display()))?;
            return Self::from_toml_str(&content);
        }
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            let content = fs::read_to_string(&pb)
                .with_context(|| format!("reading radar config from {}", pb.display()))?;
            return Self::from_toml_str(&content);
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            let content = fs::read_to_string(&default_p)
                .with_context(|| format!("reading radar config from {}", default_p.display()))?;
            return Self::from_toml_str(&content);
        }
        Self::from_toml_str(DEFAULT_RADAR_TOML)
    }

    /// Resolve the sources for a run. `None` keeps the configured order;
    /// a subset must name configured sources only.
    pub fn select_sources(&self, subset: Option<&[String]>) -> Result<Vec<SourceConfig>> {
        let Some(names) = subset else {
            return Ok(self.sources.clone());
        };
        let mut picked = Vec::with_capacity(names.len());
        for name in names {
            let found = self
                .sources
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| anyhow!("unknown source `{}`", name))?;
            picked.push(found.clone());
        }
        Ok(picked)
    }
}

/// Inclusive day cutoffs for the A/B/C buckets; anything beyond `c` is D.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct GradeThresholds {
    pub a: i64,
    pub b: i64,
    pub c: i64,
}

/// Grading tables: recency thresholds plus per-category score weights.
#[derive(Debug, Clone, Deserialize)]
pub struct GradingConfig {
    pub thresholds: GradeThresholds,
    #[serde(default = "default_default_weight")]
    pub default_weight: f64,
    #[serde(default)]
    pub type_weights: HashMap<String, f64>,
}

fn default_default_weight() -> f64 {
    0.5
}

impl GradingConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("parsing grading config json")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading grading config from {}", path.display()))?;
        Self::from_json_str(&content)
    }

    /// Explicit path or the embedded default tables.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(p) => Self::from_path(p),
            None => Self::from_json_str(DEFAULT_GRADING_JSON),
        }
    }

    /// Score weight for one category; unknown categories fall back to
    /// `default_weight`.
    pub fn weight_for(&self, category: DealCategory) -> f64 {
        self.type_weights
            .get(category.as_str())
            .copied()
            .unwrap_or(self.default_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_radar_config_parses_with_four_sources() {
        let cfg = RadarConfig::from_toml_str(DEFAULT_RADAR_TOML).unwrap();
        let names: Vec<&str> = cfg.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["animation_magazine", "kidscreen", "c21media", "variety"]
        );
        assert_eq!(cfg.limited_cap, 5);
    }

    #[test]
    fn select_sources_rejects_unknown_names() {
        let cfg = RadarConfig::from_toml_str(DEFAULT_RADAR_TOML).unwrap();
        let err = cfg
            .select_sources(Some(&["kidscreen".to_string(), "nope".to_string()]))
            .unwrap_err();
        assert!(err.to_string().contains("nope"));

        let picked = cfg
            .select_sources(Some(&["Variety".to_string()]))
            .unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "variety");
    }

    #[test]
    fn embedded_grading_tables_match_known_values() {
        let g = GradingConfig::load(None).unwrap();
        assert_eq!(g.thresholds, GradeThresholds { a: 60, b: 180, c: 365 });
        assert!((g.weight_for(DealCategory::Acquisition) - 1.0).abs() < 1e-9);
        assert!((g.weight_for(DealCategory::Commission) - 1.2).abs() < 1e-9);
        assert!((g.weight_for(DealCategory::Renewal) - 0.8).abs() < 1e-9);
        assert!((g.weight_for(DealCategory::Other) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn unknown_category_weight_falls_back_to_default() {
        let g = GradingConfig::from_json_str(
            r#"{ "thresholds": { "a": 60, "b": 180, "c": 365 }, "type_weights": {} }"#,
        )
        .unwrap();
        assert!((g.weight_for(DealCategory::Licensing) - 0.5).abs() < 1e-9);
    }

    #[serial_test::serial]
    #[test]
    fn load_prefers_env_path_when_no_explicit_path() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("radar.toml");
        fs::write(&p, "limited_cap = 2\n").unwrap();

        std::env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        let cfg = RadarConfig::load(None).unwrap();
        assert_eq!(cfg.limited_cap, 2);
        assert!(cfg.sources.is_empty());
        std::env::remove_var(ENV_CONFIG_PATH);
    }

    #[serial_test::serial]
    #[test]
    fn load_fails_on_unreadable_explicit_path() {
        let missing = Path::new("/definitely/not/here/radar.toml");
        assert!(RadarConfig::load(Some(missing)).is_err());
    }
}
