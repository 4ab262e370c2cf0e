//! Task ("story") model.
//!
//! A task with no cadence rule (or cadence `none`) is a plain, singular item
//! owning exactly one status. A recurring task is expanded into occurrences by
//! [`crate::instance::generate`] and carries its per-date exceptions in
//! `overrides`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cadence::CadenceRule;
use crate::overrides::OverrideStore;

/// Board columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Icebox,
    Backlog,
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Icebox,
        TaskStatus::Backlog,
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Icebox => "icebox",
            TaskStatus::Backlog => "backlog",
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Review => "review",
            TaskStatus::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        *self == TaskStatus::Done
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let l = s.trim().to_lowercase();
        TaskStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == l || (l == "in_progress" && *st == TaskStatus::InProgress))
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

/// Core task type.
///
/// Kept small + serializable; storage is an injected [`crate::store::TaskStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,

    pub status: TaskStatus,

    /// Positive; drives completion-percentage math.
    pub weight: u32,

    /// Sprint association for plain tasks. Recurring tasks are expanded into
    /// any window regardless of this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<String>,

    /// Optional due date for plain tasks (used by overdue displays).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<CadenceRule>,

    #[serde(default, skip_serializing_if = "OverrideStore::is_empty")]
    pub overrides: OverrideStore,

    /// Bumped on every engine update; part of the instance memo key.
    #[serde(default)]
    pub revision: u64,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Backlog,
            weight: 1,
            sprint_id: None,
            due_date: None,
            cadence: None,
            overrides: OverrideStore::new(),
            revision: 0,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_sprint(mut self, sprint_id: impl Into<String>) -> Self {
        self.sprint_id = Some(sprint_id.into());
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_cadence(mut self, rule: CadenceRule) -> Self {
        self.cadence = Some(rule);
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.cadence.as_ref().is_some_and(CadenceRule::is_recurring)
    }
}
