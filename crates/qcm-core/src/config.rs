//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::OrderMode;

/// Longest countdown a session may be given, in minutes.
pub const MAX_TIMER_MINUTES: u32 = 120;

/// Top-level qcm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcmConfig {
    /// Directory whose subdirectories are modules.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Where aggregated results are kept.
    #[serde(default = "default_stats_file")]
    pub stats_file: PathBuf,
    /// Question order when none is given on the command line.
    #[serde(default)]
    pub default_order: OrderMode,
    /// Countdown length in minutes; no countdown when absent.
    #[serde(default)]
    pub timer_minutes: Option<u32>,
    /// Exam size used when `--exam` is given without a value.
    #[serde(default = "default_exam_size")]
    pub exam_size: usize,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_stats_file() -> PathBuf {
    PathBuf::from("stats.json")
}
fn default_exam_size() -> usize {
    20
}

impl Default for QcmConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            stats_file: default_stats_file(),
            default_order: OrderMode::default(),
            timer_minutes: None,
            exam_size: default_exam_size(),
        }
    }
}

impl QcmConfig {
    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if let Some(minutes) = self.timer_minutes {
            anyhow::ensure!(
                (1..=MAX_TIMER_MINUTES).contains(&minutes),
                "timer_minutes must be between 1 and {MAX_TIMER_MINUTES}, got {minutes}"
            );
        }
        anyhow::ensure!(self.exam_size >= 1, "exam_size must be at least 1");
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `qcm.toml` in the current directory
/// 2. `~/.config/qcm/config.toml`
///
/// Environment variable overrides: `QCM_ROOT`, `QCM_STATS_FILE`.
pub fn load_config() -> Result<QcmConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QcmConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("qcm.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QcmConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QcmConfig::default(),
    };

    if let Ok(root) = std::env::var("QCM_ROOT") {
        config.root = PathBuf::from(root);
    }
    if let Ok(stats) = std::env::var("QCM_STATS_FILE") {
        config.stats_file = PathBuf::from(stats);
    }

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("qcm"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = QcmConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.stats_file, PathBuf::from("stats.json"));
        assert_eq!(config.default_order, OrderMode::Random);
        assert_eq!(config.exam_size, 20);
        assert!(config.timer_minutes.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let config: QcmConfig = toml::from_str(
            r#"
root = "banks"
default_order = "fixed"
timer_minutes = 30
"#,
        )
        .unwrap();
        assert_eq!(config.root, PathBuf::from("banks"));
        assert_eq!(config.default_order, OrderMode::Fixed);
        assert_eq!(config.timer_minutes, Some(30));
        assert_eq!(config.stats_file, PathBuf::from("stats.json"));
    }

    #[test]
    fn explicit_missing_file_fails() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_file_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qcm.toml");
        std::fs::write(&path, "timer_minutes = 500\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("timer_minutes"));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qcm.toml");
        std::fs::write(&path, "root = [").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config"));
    }
}
