//! sprintboard-core: recurring task instance engine and board aggregation
//!
//! Stored tasks flow through [`generate`] per active window into a flat list of
//! board items, which [`aggregate`] groups by resolved status. Edits flow back
//! through [`apply`] (or [`update_task`] against a [`TaskStore`]).

pub mod board;
pub mod cache;
pub mod cadence;
pub mod error;
pub mod instance;
pub mod overrides;
pub mod store;
pub mod task;
pub mod time;
pub mod update;
pub mod window;

pub use board::{Board, Sprint, aggregate, collect_items, collect_items_cached, overdue, upcoming};
pub use cache::InstanceCache;
pub use cadence::{CadenceKind, CadenceRule, parse_weekdays};
pub use error::{EngineError, EngineResult};
pub use instance::{BoardItem, InstanceKey, VirtualInstance, generate, parse_legacy_instance_id};
pub use overrides::{OccurrenceOverride, OverrideStore, clear_from};
pub use store::{InMemoryStore, TaskStore, update_task};
pub use task::{Task, TaskStatus};
pub use time::{parse_iso_date, to_iso_date, today_in};
pub use update::{CadencePatch, EditMode, TaskUpdate, apply};
pub use window::DateWindow;
