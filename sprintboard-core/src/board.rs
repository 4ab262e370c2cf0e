//! Board aggregation: fold plain tasks and generated instances for a window
//! into status columns plus completion metrics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cache::InstanceCache;
use crate::instance::BoardItem;
use crate::task::{Task, TaskStatus};
use crate::window::DateWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub window: DateWindow,
}

impl Sprint {
    pub fn new(id: impl Into<String>, name: impl Into<String>, window: DateWindow) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            window,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Every status column, in board order, even when empty.
    pub columns: BTreeMap<TaskStatus, Vec<BoardItem>>,
    pub weight_by_status: BTreeMap<TaskStatus, u64>,
    /// Skipped occurrences: shown apart, excluded from columns and weights.
    pub skipped: Vec<BoardItem>,
    pub total_weight: u64,
    pub completed_weight: u64,
}

impl Board {
    fn empty() -> Self {
        Self {
            columns: TaskStatus::ALL.into_iter().map(|s| (s, Vec::new())).collect(),
            weight_by_status: TaskStatus::ALL.into_iter().map(|s| (s, 0)).collect(),
            ..Self::default()
        }
    }

    /// Build from an already-flattened item list.
    pub fn from_items(items: impl IntoIterator<Item = BoardItem>) -> Self {
        let mut board = Self::empty();
        for item in items {
            if item.is_skipped() {
                board.skipped.push(item);
                continue;
            }
            let status = item.status();
            let weight = u64::from(item.weight());
            board.total_weight += weight;
            if status.is_done() {
                board.completed_weight += weight;
            }
            *board.weight_by_status.entry(status).or_default() += weight;
            board.columns.entry(status).or_default().push(item);
        }
        board
    }

    pub fn column(&self, status: TaskStatus) -> &[BoardItem] {
        self.columns.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn item_count(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// 0.0 - 100.0; an empty pool reports 0.
    pub fn completion_percent(&self) -> f64 {
        if self.total_weight == 0 {
            return 0.0;
        }
        self.completed_weight as f64 * 100.0 / self.total_weight as f64
    }
}

/// Flatten the collection for `window`: recurring tasks expand into their
/// occurrences, plain tasks are included when associated with `sprint_id`.
pub fn collect_items(tasks: &[Task], window: &DateWindow, sprint_id: Option<&str>) -> Vec<BoardItem> {
    collect_items_cached(&mut InstanceCache::new(), tasks, window, sprint_id)
}

/// [`collect_items`] for long-lived consumers that re-render after every
/// store write; unchanged tasks reuse their generated instances.
pub fn collect_items_cached(
    cache: &mut InstanceCache,
    tasks: &[Task],
    window: &DateWindow,
    sprint_id: Option<&str>,
) -> Vec<BoardItem> {
    let mut out = Vec::new();
    for task in tasks {
        if task.is_recurring() {
            out.extend(cache.get_or_generate(task, window).iter().cloned().map(BoardItem::Instance));
        } else if sprint_id.is_some() && task.sprint_id.as_deref() == sprint_id {
            out.push(BoardItem::Plain(task.clone()));
        }
    }
    out
}

pub fn aggregate(tasks: &[Task], sprint: &Sprint) -> Board {
    Board::from_items(collect_items(tasks, &sprint.window, Some(sprint.id.as_str())))
}

/// Items dated before `today` that are neither done nor skipped.
pub fn overdue(items: &[BoardItem], today: NaiveDate) -> Vec<&BoardItem> {
    let mut out: Vec<&BoardItem> = items
        .iter()
        .filter(|i| !i.is_skipped() && !i.status().is_done())
        .filter(|i| i.date().is_some_and(|d| d < today))
        .collect();
    out.sort_by_key(|i| i.date());
    out
}

/// Occurrences from `today` through the next `days` days, ascending by date.
pub fn upcoming(tasks: &[Task], today: NaiveDate, days: u64) -> Vec<BoardItem> {
    let Ok(window) = DateWindow::days_from(today, days) else {
        return vec![];
    };
    let mut out = collect_items(tasks, &window, None);
    out.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.id().cmp(&b.id())));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::CadenceRule;
    use crate::overrides::OccurrenceOverride;
    use chrono::Weekday;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sprint() -> Sprint {
        Sprint::new("s1", "Week 1", DateWindow::new(d("2024-01-01"), d("2024-01-07")).unwrap())
    }

    fn fixture() -> Vec<Task> {
        vec![
            Task::new("a", "essay").with_weight(5).with_status(TaskStatus::Done).with_sprint("s1"),
            Task::new("b", "lab").with_weight(8).with_status(TaskStatus::Todo).with_sprint("s1"),
            Task::new("c", "read").with_weight(3).with_status(TaskStatus::InProgress).with_sprint("s1"),
            Task::new("x", "other sprint").with_weight(13).with_sprint("s2"),
            Task::new("r", "gym")
                .with_weight(2)
                .with_status(TaskStatus::Todo)
                .with_cadence(CadenceRule::weekly([Weekday::Mon, Weekday::Wed])),
        ]
    }

    #[test]
    fn test_aggregate_weights_and_columns() {
        let board = aggregate(&fixture(), &sprint());
        assert_eq!(board.item_count(), 5);
        assert_eq!(board.total_weight, 20);
        assert_eq!(board.completed_weight, 5);
        assert_eq!(board.completion_percent(), 25.0);

        let todo = board.column(TaskStatus::Todo);
        assert_eq!(todo.len(), 3);
        assert_eq!(todo.iter().filter(|i| matches!(i, BoardItem::Instance(_))).count(), 2);
        assert_eq!(board.weight_by_status[&TaskStatus::Todo], 12);
        assert!(board.column(TaskStatus::Icebox).is_empty());
    }

    #[test]
    fn test_skipped_instances_leave_the_pool() {
        let mut tasks = fixture();
        tasks[4]
            .overrides
            .set(d("2024-01-03"), OccurrenceOverride::edited(None, Some(true)));
        let board = aggregate(&tasks, &sprint());
        assert_eq!(board.skipped.len(), 1);
        assert_eq!(board.total_weight, 18);
        assert_eq!(board.column(TaskStatus::Todo).len(), 2);
    }

    #[test]
    fn test_empty_board() {
        let board = aggregate(&[], &sprint());
        assert_eq!(board.completion_percent(), 0.0);
        assert_eq!(board.columns.len(), TaskStatus::ALL.len());
    }

    #[test]
    fn test_overdue_and_upcoming() {
        let tasks = fixture();
        let items = collect_items(&tasks, &sprint().window, Some("s1"));
        let late = overdue(&items, d("2024-01-04"));
        // Mon 01-01 and Wed 01-03 occurrences are todo and in the past
        assert_eq!(late.len(), 2);
        assert_eq!(late[0].date(), Some(d("2024-01-01")));

        let next = upcoming(&tasks, d("2024-01-04"), 7);
        let dates: Vec<_> = next.iter().filter_map(BoardItem::date).collect();
        assert_eq!(dates, vec![d("2024-01-08"), d("2024-01-10")]);
        assert!(upcoming(&tasks, d("2024-01-04"), 0).is_empty());
    }
}
