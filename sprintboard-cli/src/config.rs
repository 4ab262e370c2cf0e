use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sprintboard_core::time::date_in_tz;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::state::ensure_sprintboard_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSection,
    #[serde(default)]
    pub board: BoardSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSection {
    /// IANA timezone; only used to decide what "today" is.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Workspace JSON file (default: ~/.sprintboard/workspace.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSection {
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u64,
    #[serde(default)]
    pub show_skipped: bool,
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

fn default_upcoming_days() -> u64 {
    7
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            data_file: None,
        }
    }
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            upcoming_days: default_upcoming_days(),
            show_skipped: false,
        }
    }
}

impl Config {
    /// Reject settings the board commands cannot act on.
    pub fn validate(&self) -> Result<()> {
        date_in_tz(Utc::now(), &self.general.timezone).context("[general] timezone")?;
        if self.board.upcoming_days == 0 {
            bail!("[board] upcoming_days must be at least 1");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_sprintboard_home()?.join("config.toml"))
}

/// Effective config: the file at `config_path()`, or defaults when absent.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_config(&s).with_context(|| format!("in {}", path.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("parse config.toml")?;
    cfg.validate()?;
    Ok(cfg)
}

/// Write defaults to `path` unless a file is already there. Returns whether
/// anything was written.
pub fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    let s = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(true)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if write_default_config(&p)? {
        info!(path = %p.display(), "default config written");
        println!("Wrote {}", p.display());
    } else {
        println!("Config already exists: {}", p.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg = parse_config("[board]\nshow_skipped = true\n").unwrap();
        assert!(cfg.board.show_skipped);
        assert_eq!(cfg.board.upcoming_days, 7);
        assert_eq!(cfg.general.timezone, "America/Chicago");
        assert!(cfg.general.data_file.is_none());
    }

    #[test]
    fn rejects_unknown_timezone_and_zero_horizon() {
        let err = parse_config("[general]\ntimezone = \"Mars/Olympus\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("timezone"));
        assert!(parse_config("[board]\nupcoming_days = 0\n").is_err());
    }

    #[test]
    fn write_default_config_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");

        assert!(write_default_config(&p).unwrap());
        assert_eq!(load_config_from(&p).unwrap().board.upcoming_days, 7);

        fs::write(&p, "[board]\nupcoming_days = 14\n").unwrap();
        assert!(!write_default_config(&p).unwrap());
        assert_eq!(load_config_from(&p).unwrap().board.upcoming_days, 14);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.general.timezone, "America/Chicago");
    }

    #[test]
    fn default_config_round_trips() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back = parse_config(&s).unwrap();
        assert_eq!(back.general.timezone, "America/Chicago");
    }
}
