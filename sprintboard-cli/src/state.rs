//! Where sprintboard keeps its files.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::Config;

/// `$SPRINTBOARD_HOME` when set, else `~/.sprintboard`.
pub fn sprintboard_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("SPRINTBOARD_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var_os("HOME").context("neither SPRINTBOARD_HOME nor HOME is set")?;
    Ok(PathBuf::from(home).join(".sprintboard"))
}

pub fn ensure_sprintboard_home() -> Result<PathBuf> {
    let dir = sprintboard_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Workspace document location: `general.data_file` if set, else
/// `workspace.json` in the home dir. A relative `data_file` resolves against
/// the home dir too.
pub fn workspace_path(cfg: &Config) -> Result<PathBuf> {
    match &cfg.general.data_file {
        Some(p) if p.is_absolute() => Ok(p.clone()),
        Some(p) => Ok(ensure_sprintboard_home()?.join(p)),
        None => Ok(ensure_sprintboard_home()?.join("workspace.json")),
    }
}
