//! Recurrence update engine: the three edit-propagation modes.
//!
//! `apply` never mutates the caller's task; it returns the new base task with
//! its override store already adjusted for the mode.
//!
//! Non-recurrence fields (title, description, weight, sprint, due date) always
//! land on the base task. Only status and cadence follow the mode:
//!
//! | mode     | status                  | cadence        | overrides                 |
//! |----------|-------------------------|----------------|---------------------------|
//! | `this`   | override at the date    | untouched      | one entry merged          |
//! | `future` | not applied             | patch merged   | entries >= date cleared   |
//! | `all`    | base status             | patch merged   | all cleared               |

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cadence::{CadenceKind, CadenceRule};
use crate::error::{EngineError, EngineResult};
use crate::overrides::{OverrideStore, clear_from};
use crate::task::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// This occurrence only.
    This,
    /// This and all future occurrences.
    Future,
    /// Every occurrence.
    All,
}

impl EditMode {
    pub fn requires_instance_date(&self) -> bool {
        matches!(self, EditMode::This | EditMode::Future)
    }
}

impl std::fmt::Display for EditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EditMode::This => "this",
            EditMode::Future => "future",
            EditMode::All => "all",
        })
    }
}

impl std::str::FromStr for EditMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "this" => Ok(EditMode::This),
            "future" => Ok(EditMode::Future),
            "all" => Ok(EditMode::All),
            other => Err(format!("unknown edit mode: {other} (expected this|future|all)")),
        }
    }
}

/// Partial cadence rule; present fields replace the base rule's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CadencePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<CadenceKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<Weekday>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl CadencePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn merge_into(&self, mut rule: CadenceRule) -> CadenceRule {
        if let Some(kind) = self.cadence {
            rule.cadence = kind;
        }
        if let Some(days) = &self.days_of_week {
            rule.days_of_week = days.clone();
        }
        if let Some(n) = self.interval_days {
            rule.interval_days = Some(n);
        }
        if let Some(s) = self.start_date {
            rule.start_date = Some(s);
        }
        if let Some(e) = self.end_date {
            rule.end_date = Some(e);
        }
        rule
    }
}

/// Proposed field changes. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<CadencePatch>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_cadence(mut self, patch: CadencePatch) -> Self {
        self.cadence = Some(patch);
        self
    }

    pub fn skip(mut self) -> Self {
        self.skipped = Some(true);
        self
    }
}

/// Compute the updated task for `updates` under `mode`.
///
/// `this` and `future` need `instance_date`; it is never guessed.
pub fn apply(
    task: &Task,
    updates: &TaskUpdate,
    mode: EditMode,
    instance_date: Option<NaiveDate>,
) -> EngineResult<Task> {
    if mode.requires_instance_date() && instance_date.is_none() {
        return Err(EngineError::MissingInstanceDate { mode });
    }
    if updates.weight == Some(0) {
        return Err(EngineError::InvalidWeight);
    }

    let mut next = task.clone();
    apply_plain_fields(&mut next, updates);

    let cleared = match (mode, instance_date) {
        (EditMode::This, Some(date)) => {
            let rule = recurring_rule(task)?;
            if !rule.occurs_on(date) {
                return Err(EngineError::NotAnOccurrence {
                    task_id: task.id.clone(),
                    date,
                });
            }
            if updates.cadence.as_ref().is_some_and(|p| !p.is_empty()) {
                debug!(task_id = %task.id, "cadence patch ignored for single-occurrence edit");
            }
            if updates.status.is_some() || updates.skipped.is_some() {
                let entry = task
                    .overrides
                    .get(date)
                    .cloned()
                    .unwrap_or_default()
                    .amend(updates.status, updates.skipped);
                next.overrides.set(date, entry);
            }
            0
        }
        (EditMode::Future, Some(date)) => {
            let rule = recurring_rule(task)?;
            next.cadence = Some(merge_cadence(rule, updates.cadence.as_ref())?);
            next.overrides = clear_from(&task.overrides, Some(date));
            if let Some(status) = updates.status {
                // Open question: the edited occurrence reverts to the base status.
                debug!(task_id = %task.id, %status, %date, "status not applied in future mode");
            }
            task.overrides.len() - next.overrides.len()
        }
        (EditMode::All, _) => {
            if let Some(patch) = &updates.cadence {
                let base = task.cadence.clone().unwrap_or_default();
                next.cadence = Some(merge_cadence(&base, Some(patch))?);
            }
            if let Some(status) = updates.status {
                next.status = status;
            }
            next.overrides = OverrideStore::new();
            task.overrides.len()
        }
        (mode, None) => return Err(EngineError::MissingInstanceDate { mode }),
    };

    next.revision = task.revision.wrapping_add(1);

    debug!(
        task_id = %task.id,
        %mode,
        instance_date = ?instance_date,
        cleared_overrides = cleared,
        revision = next.revision,
        "applied task update"
    );

    Ok(next)
}

fn apply_plain_fields(task: &mut Task, updates: &TaskUpdate) {
    if let Some(title) = &updates.title {
        task.title = title.clone();
    }
    if let Some(description) = &updates.description {
        task.description = description.clone();
    }
    if let Some(weight) = updates.weight {
        task.weight = weight;
    }
    if let Some(sprint_id) = &updates.sprint_id {
        task.sprint_id = Some(sprint_id.clone());
    }
    if let Some(due) = updates.due_date {
        task.due_date = Some(due);
    }
}

fn recurring_rule(task: &Task) -> EngineResult<&CadenceRule> {
    task.cadence
        .as_ref()
        .filter(|r| r.is_recurring())
        .ok_or_else(|| EngineError::NotRecurring {
            task_id: task.id.clone(),
        })
}

fn merge_cadence(base: &CadenceRule, patch: Option<&CadencePatch>) -> EngineResult<CadenceRule> {
    let merged = match patch {
        Some(p) => p.merge_into(base.clone()),
        None => base.clone(),
    };
    merged.validate()?;
    Ok(merged)
}
