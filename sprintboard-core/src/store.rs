//! Store seam: the engine reads a snapshot and writes back the whole
//! collection through one path, so derived views recompute consistently.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use crate::error::EngineError;
use crate::task::Task;
use crate::update::{EditMode, TaskUpdate, apply};

/// Injected read/write interface over the task collection.
pub trait TaskStore {
    fn snapshot(&self) -> Result<Vec<Task>>;

    /// Replace the whole collection. There are no partial writes.
    fn replace(&mut self, tasks: Vec<Task>) -> Result<()>;
}

type Subscriber = Box<dyn FnMut(&[Task])>;

/// In-memory store that notifies subscribers after every write.
#[derive(Default)]
pub struct InMemoryStore {
    tasks: Vec<Task>,
    subscribers: Vec<Subscriber>,
}

impl InMemoryStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, f: impl FnMut(&[Task]) + 'static) {
        self.subscribers.push(Box::new(f));
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("tasks", &self.tasks.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl TaskStore for InMemoryStore {
    fn snapshot(&self) -> Result<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn replace(&mut self, tasks: Vec<Task>) -> Result<()> {
        self.tasks = tasks;
        for s in &mut self.subscribers {
            s(&self.tasks);
        }
        Ok(())
    }
}

/// The single write path: snapshot, apply, replace, return the new task.
pub fn update_task<S: TaskStore + ?Sized>(
    store: &mut S,
    task_id: &str,
    updates: &TaskUpdate,
    mode: EditMode,
    instance_date: Option<NaiveDate>,
) -> Result<Task> {
    let mut tasks = store.snapshot()?;
    let slot = tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_else(|| EngineError::TaskNotFound {
            task_id: task_id.to_string(),
        })?;

    let updated = apply(slot, updates, mode, instance_date)?;
    *slot = updated.clone();

    debug!(task_id, revision = updated.revision, count = tasks.len(), "writing task collection");
    store.replace(tasks)?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::CadenceRule;
    use crate::task::TaskStatus;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn update_writes_whole_collection_and_notifies() {
        let mut store = InMemoryStore::new(vec![
            Task::new("p", "plain"),
            Task::new("r", "daily").with_cadence(CadenceRule::daily()),
        ]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |tasks| sink.borrow_mut().push(tasks.len()));

        let out = update_task(
            &mut store,
            "r",
            &TaskUpdate::status(TaskStatus::Done),
            EditMode::This,
            Some(d("2024-01-02")),
        )
        .unwrap();

        assert_eq!(out.overrides.len(), 1);
        assert_eq!(store.tasks()[1], out);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn unknown_task_is_rejected_without_write() {
        let mut store = InMemoryStore::new(vec![Task::new("p", "plain")]);
        let calls = Rc::new(RefCell::new(0));
        let c = Rc::clone(&calls);
        store.subscribe(move |_| *c.borrow_mut() += 1);

        let err = update_task(&mut store, "nope", &TaskUpdate::default(), EditMode::All, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::TaskNotFound { .. })
        ));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn rejected_update_leaves_store_unchanged() {
        let mut store = InMemoryStore::new(vec![Task::new("r", "daily").with_cadence(CadenceRule::daily())]);
        let before = store.snapshot().unwrap();
        let err = update_task(&mut store, "r", &TaskUpdate::status(TaskStatus::Done), EditMode::Future, None);
        assert!(err.is_err());
        assert_eq!(store.snapshot().unwrap(), before);
    }
}
