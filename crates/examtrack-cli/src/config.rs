//! Presentation defaults for the CLI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examtrack_core::model::Granularity;
use examtrack_core::trend::PERCENT_LADDER;

/// Per-granularity goals the CLI classifies buckets against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Targets {
    /// Questions per day.
    #[serde(default = "default_daily")]
    pub daily: f64,
    /// Questions per week.
    #[serde(default = "default_weekly")]
    pub weekly: f64,
    /// Questions per month.
    #[serde(default = "default_monthly")]
    pub monthly: f64,
    /// Mean placement score for exam buckets, any granularity.
    #[serde(default = "default_exam")]
    pub exam: f64,
}

fn default_daily() -> f64 {
    80.0
}
fn default_weekly() -> f64 {
    560.0
}
fn default_monthly() -> f64 {
    2400.0
}
fn default_exam() -> f64 {
    400.0
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            daily: default_daily(),
            weekly: default_weekly(),
            monthly: default_monthly(),
            exam: default_exam(),
        }
    }
}

impl Targets {
    /// Practice volume target for a granularity.
    pub fn practice(&self, granularity: Granularity) -> f64 {
        match granularity {
            Granularity::Daily => self.daily,
            Granularity::Weekly => self.weekly,
            Granularity::Monthly => self.monthly,
        }
    }
}

/// Top-level examtrack configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamtrackConfig {
    /// Granularity used when `--granularity` is not given.
    #[serde(default)]
    pub default_granularity: Granularity,
    #[serde(default)]
    pub targets: Targets,
    /// Rungs for the accuracy chart floor.
    #[serde(default = "default_ladder")]
    pub accuracy_ladder: Vec<f64>,
}

fn default_ladder() -> Vec<f64> {
    PERCENT_LADDER.to_vec()
}

impl Default for ExamtrackConfig {
    fn default() -> Self {
        Self {
            default_granularity: Granularity::default(),
            targets: Targets::default(),
            accuracy_ladder: default_ladder(),
        }
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `path`, which must exist when given
/// 2. `examtrack.toml` in the current directory
/// 3. `~/.config/examtrack/config.toml`
///
/// Environment variable overrides: `EXAMTRACK_TARGET_DAILY`,
/// `EXAMTRACK_TARGET_WEEKLY`, `EXAMTRACK_TARGET_MONTHLY`.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamtrackConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examtrack.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config_file(&path)?
        }
        None => ExamtrackConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<ExamtrackConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<ExamtrackConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn apply_env_overrides(config: &mut ExamtrackConfig) -> Result<()> {
    let targets = &mut config.targets;
    for (var, slot) in [
        ("EXAMTRACK_TARGET_DAILY", &mut targets.daily),
        ("EXAMTRACK_TARGET_WEEKLY", &mut targets.weekly),
        ("EXAMTRACK_TARGET_MONTHLY", &mut targets.monthly),
    ] {
        if let Ok(raw) = std::env::var(var) {
            *slot = raw
                .trim()
                .parse()
                .with_context(|| format!("{var} must be a number, got {raw:?}"))?;
        }
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examtrack"))
}
