//! Instance generation: expand a recurring task into dated occurrences.
//!
//! Instances are never stored. Every call synthesizes a fresh list from
//! (task, window) alone, so the same inputs always produce the same output.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cadence::CadenceRule;
use crate::task::{Task, TaskStatus};
use crate::time::{parse_iso_date, to_iso_date};
use crate::window::DateWindow;

/// Addresses one occurrence: the originating task plus the occurrence date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceKey {
    pub base_id: String,
    pub date: NaiveDate,
}

impl InstanceKey {
    pub fn new(base_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            base_id: base_id.into(),
            date,
        }
    }
}

/// Display form is `<baseId>-<YYYY-MM-DD>`, for UI addressing only.
impl std::fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.base_id, to_iso_date(self.date))
    }
}

/// One concrete occurrence of a recurring task.
///
/// Carries every base-task field except the override store and revision, so
/// consumers can render it in place of a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualInstance {
    pub key: InstanceKey,
    pub title: String,
    pub description: String,
    pub weight: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadence: Option<CadenceRule>,
    pub base_status: TaskStatus,
    /// Override status if one exists for this date, else the base status.
    pub status: TaskStatus,
    pub skipped: bool,
    pub modified: bool,
}

impl VirtualInstance {
    fn resolve(task: &Task, date: NaiveDate) -> Self {
        let entry = task.overrides.get(date);
        Self {
            key: InstanceKey::new(task.id.clone(), date),
            title: task.title.clone(),
            description: task.description.clone(),
            weight: task.weight,
            sprint_id: task.sprint_id.clone(),
            due_date: task.due_date,
            cadence: task.cadence.clone(),
            base_status: task.status,
            status: entry.and_then(|o| o.status).unwrap_or(task.status),
            skipped: entry.is_some_and(|o| o.is_skipped()),
            modified: entry.is_some_and(|o| o.modified),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.key.date
    }

    pub fn base_id(&self) -> &str {
        &self.key.base_id
    }
}

/// Anything that can sit on the board. Consumers branch on the tag, never on
/// the shape of an id string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BoardItem {
    Instance(VirtualInstance),
    Plain(Task),
}

impl BoardItem {
    pub fn id(&self) -> String {
        match self {
            BoardItem::Instance(i) => i.key.to_string(),
            BoardItem::Plain(t) => t.id.clone(),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            BoardItem::Instance(i) => &i.title,
            BoardItem::Plain(t) => &t.title,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            BoardItem::Instance(i) => i.status,
            BoardItem::Plain(t) => t.status,
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            BoardItem::Instance(i) => i.weight,
            BoardItem::Plain(t) => t.weight,
        }
    }

    /// Occurrence date for instances, due date (if any) for plain tasks.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            BoardItem::Instance(i) => Some(i.key.date),
            BoardItem::Plain(t) => t.due_date,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BoardItem::Instance(i) if i.skipped)
    }
}

/// Expand `task` over `window`, ascending by date.
///
/// Plain tasks (no cadence, or cadence `none`) yield nothing; consumers handle
/// them directly. Malformed rules also yield nothing instead of failing, since
/// this runs on every render.
pub fn generate(task: &Task, window: &DateWindow) -> Vec<VirtualInstance> {
    let Some(rule) = task.cadence.as_ref().filter(|r| r.is_recurring()) else {
        return vec![];
    };

    if let Err(e) = rule.validate() {
        warn!(task_id = %task.id, error = %e, "malformed cadence rule, skipping expansion");
        return vec![];
    }

    let Some(span) = window.clamp(rule.start_date, rule.end_date) else {
        return vec![];
    };

    span.days()
        .filter(|d| rule.occurs_on(*d))
        .map(|d| VirtualInstance::resolve(task, d))
        .collect()
}

/// Split the legacy `<baseId>-<YYYY-MM-DD>` string convention.
///
/// Returns `None` when the suffix is not a real calendar date.
pub fn parse_legacy_instance_id(id: &str) -> Option<InstanceKey> {
    let re = Regex::new(r"^(.+)-(\d{4}-\d{2}-\d{2})$").ok()?;
    let caps = re.captures(id)?;
    let date = parse_iso_date(&caps[2]).ok()?;
    Some(InstanceKey::new(&caps[1], date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::OccurrenceOverride;
    use chrono::Weekday;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn window(a: &str, b: &str) -> DateWindow {
        DateWindow::new(d(a), d(b)).unwrap()
    }

    fn mon_wed() -> Task {
        Task::new("t1", "gym")
            .with_weight(3)
            .with_cadence(CadenceRule::weekly([Weekday::Mon, Weekday::Wed]).starting(d("2024-01-01")))
    }

    #[test]
    fn test_weekly_expansion_in_order() {
        let out = generate(&mon_wed(), &window("2024-01-01", "2024-01-14"));
        let dates: Vec<_> = out.iter().map(|i| i.date()).collect();
        assert_eq!(
            dates,
            vec![d("2024-01-01"), d("2024-01-03"), d("2024-01-08"), d("2024-01-10")]
        );
        assert!(out.iter().all(|i| i.status == TaskStatus::Backlog));
        assert_eq!(out[1].key.to_string(), "t1-2024-01-03");
    }

    #[test]
    fn test_instance_carries_base_fields() {
        let due = d("2024-01-31");
        let t = mon_wed().with_sprint("s1").with_due_date(due);
        let inst = generate(&t, &window("2024-01-01", "2024-01-01")).remove(0);
        assert_eq!(inst.sprint_id.as_deref(), Some("s1"));
        assert_eq!(inst.due_date, Some(due));
        assert_eq!(inst.cadence, t.cadence);
        assert_eq!(inst.weight, 3);

        let v = serde_json::to_value(&inst).unwrap();
        assert_eq!(v["sprintId"], "s1");
        assert_eq!(v["cadence"]["daysOfWeek"], serde_json::json!(["Mon", "Wed"]));
    }

    #[test]
    fn test_plain_task_yields_nothing() {
        let t = Task::new("p", "plain");
        assert!(generate(&t, &window("2024-01-01", "2024-12-31")).is_empty());
    }

    #[test]
    fn test_window_edges_inclusive() {
        let t = Task::new("d", "daily").with_cadence(CadenceRule::daily());
        let out = generate(&t, &window("2024-01-01", "2024-01-01"));
        assert_eq!(out.len(), 1);

        let bounded = Task::new("d", "daily")
            .with_cadence(CadenceRule::daily().starting(d("2024-01-02")).ending(d("2024-01-03")));
        assert!(generate(&bounded, &window("2024-01-04", "2024-01-10")).is_empty());
        assert!(generate(&bounded, &window("2023-12-01", "2024-01-01")).is_empty());
    }

    #[test]
    fn test_override_resolves_status() {
        let mut t = mon_wed();
        t.overrides.set(
            d("2024-01-03"),
            OccurrenceOverride::edited(Some(TaskStatus::Done), None),
        );
        let out = generate(&t, &window("2024-01-01", "2024-01-07"));
        assert_eq!(out[0].status, TaskStatus::Backlog);
        assert_eq!(out[1].status, TaskStatus::Done);
        assert!(out[1].modified);
        assert_eq!(out[1].base_status, TaskStatus::Backlog);
    }

    #[test]
    fn test_stale_override_not_surfaced() {
        let mut t = mon_wed();
        // a Tuesday: not generated by Mon/Wed
        t.overrides.set(
            d("2024-01-02"),
            OccurrenceOverride::edited(Some(TaskStatus::Done), None),
        );
        let out = generate(&t, &window("2024-01-01", "2024-01-07"));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|i| i.date() != d("2024-01-02")));
    }

    #[test]
    fn test_malformed_rule_degrades_to_empty() {
        let t = Task::new("w", "weekly").with_cadence(CadenceRule::weekly([]));
        assert!(generate(&t, &window("2024-01-01", "2024-01-31")).is_empty());
    }

    #[test]
    fn test_board_item_tag() {
        let inst = generate(&mon_wed(), &window("2024-01-01", "2024-01-01")).remove(0);
        let v = serde_json::to_value(BoardItem::Instance(inst)).unwrap();
        assert_eq!(v["kind"], "instance");
        assert_eq!(v["key"]["baseId"], "t1");

        let v = serde_json::to_value(BoardItem::Plain(Task::new("p", "x"))).unwrap();
        assert_eq!(v["kind"], "plain");
    }

    #[test]
    fn test_parse_legacy_instance_id() {
        let k = parse_legacy_instance_id("story-42-2024-01-03").unwrap();
        assert_eq!(k.base_id, "story-42");
        assert_eq!(k.date, d("2024-01-03"));

        assert!(parse_legacy_instance_id("story-42").is_none());
        assert!(parse_legacy_instance_id("story-2024-13-40").is_none());
    }
}
