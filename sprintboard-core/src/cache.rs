//! Memoized instance generation.
//!
//! Keyed by (task id, window start, window end, task revision). Generation is
//! pure, so a hit is always equal to a fresh call as long as tasks are only
//! changed through [`crate::update::apply`], which bumps the revision. A miss
//! evicts entries left behind by older revisions of the same task.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::instance::{VirtualInstance, generate};
use crate::task::Task;
use crate::window::DateWindow;

type CacheKey = (String, NaiveDate, NaiveDate, u64);

#[derive(Debug, Default)]
pub struct InstanceCache {
    entries: HashMap<CacheKey, Vec<VirtualInstance>>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_or_generate(&mut self, task: &Task, window: &DateWindow) -> &[VirtualInstance] {
        let key = (task.id.clone(), window.start(), window.end(), task.revision);
        if self.entries.contains_key(&key) {
            debug!(task_id = %task.id, "instance cache hit");
        } else {
            let before = self.entries.len();
            self.entries
                .retain(|(id, .., revision), _| id != &task.id || *revision == task.revision);
            debug!(task_id = %task.id, evicted = before - self.entries.len(), "instance cache miss");
        }
        self.entries.entry(key).or_insert_with(|| generate(task, window))
    }

    /// Drop every entry for `task_id`, whatever the window or revision.
    pub fn invalidate(&mut self, task_id: &str) {
        self.entries.retain(|(id, ..), _| id != task_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::CadenceRule;
    use crate::task::TaskStatus;
    use crate::update::{EditMode, TaskUpdate, apply};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn revision_bump_misses_cache() {
        let w = DateWindow::new(d("2024-01-01"), d("2024-01-03")).unwrap();
        let t = Task::new("r", "daily").with_cadence(CadenceRule::daily());
        let mut cache = InstanceCache::new();

        assert_eq!(cache.get_or_generate(&t, &w).len(), 3);
        assert_eq!(cache.get_or_generate(&t, &w).len(), 3);
        assert_eq!(cache.len(), 1);

        let t2 = apply(&t, &TaskUpdate::status(TaskStatus::Done), EditMode::This, Some(d("2024-01-02"))).unwrap();
        let fresh = cache.get_or_generate(&t2, &w).to_vec();
        assert_eq!(fresh, generate(&t2, &w));
        assert_eq!(fresh[1].status, TaskStatus::Done);
        // the revision-0 entry is gone
        assert_eq!(cache.len(), 1);

        cache.invalidate("r");
        assert!(cache.is_empty());
    }

    #[test]
    fn stale_revisions_evicted_per_task() {
        let w1 = DateWindow::new(d("2024-01-01"), d("2024-01-03")).unwrap();
        let w2 = DateWindow::new(d("2024-01-04"), d("2024-01-06")).unwrap();
        let a = Task::new("a", "daily").with_cadence(CadenceRule::daily());
        let b = Task::new("b", "daily").with_cadence(CadenceRule::daily());
        let mut cache = InstanceCache::new();

        cache.get_or_generate(&a, &w1);
        cache.get_or_generate(&a, &w2);
        cache.get_or_generate(&b, &w1);
        assert_eq!(cache.len(), 3);

        let mut a2 = a.clone();
        for _ in 0..5 {
            a2 = apply(&a2, &TaskUpdate::default().with_title("lift"), EditMode::All, None).unwrap();
            cache.get_or_generate(&a2, &w1);
        }
        // one entry for the current revision of `a`, b untouched
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_or_generate(&b, &w1).len(), 3);
        assert_eq!(cache.len(), 2);
    }
}
