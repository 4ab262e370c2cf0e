//! File-backed workspace: sprints plus the task collection in one JSON document.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use sprintboard_core::{Sprint, Task, TaskStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Workspace {
    pub fn sprint(&self, id: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Reject documents with duplicate ids or unusable cadence rules.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for t in &self.tasks {
            if !seen.insert(t.id.as_str()) {
                bail!("duplicate task id: {}", t.id);
            }
            if t.weight == 0 {
                bail!("task {}: weight must be a positive integer", t.id);
            }
            if let Some(rule) = t.cadence.as_ref().filter(|r| r.is_recurring()) {
                rule.validate()
                    .with_context(|| format!("task {}: invalid cadence", t.id))?;
            }
        }
        let mut seen = std::collections::HashSet::new();
        for s in &self.sprints {
            if !seen.insert(s.id.as_str()) {
                bail!("duplicate sprint id: {}", s.id);
            }
        }
        Ok(())
    }

    pub fn parse(s: &str) -> Result<Self> {
        let ws: Workspace = serde_json::from_str(s).context("parse workspace JSON")?;
        ws.validate()?;
        Ok(ws)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize workspace")
    }
}

/// [`TaskStore`] over a workspace JSON file. Every write rewrites the file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Workspace> {
        if !self.path.exists() {
            return Ok(Workspace::default());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        Workspace::parse(&s).with_context(|| format!("load {}", self.path.display()))
    }

    pub fn save(&self, ws: &Workspace) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        fs::write(&self.path, ws.to_json()?)
            .with_context(|| format!("write {}", self.path.display()))?;
        debug!(path = %self.path.display(), tasks = ws.tasks.len(), "saved workspace");
        Ok(())
    }
}

impl TaskStore for JsonFileStore {
    fn snapshot(&self) -> Result<Vec<Task>> {
        Ok(self.load()?.tasks)
    }

    fn replace(&mut self, tasks: Vec<Task>) -> Result<()> {
        let mut ws = self.load()?;
        ws.tasks = tasks;
        self.save(&ws)
    }
}
