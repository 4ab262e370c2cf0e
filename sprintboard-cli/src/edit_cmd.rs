use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Args;
use sprintboard_core::{
    CadenceKind, CadencePatch, EditMode, InstanceKey, TaskStatus, TaskStore, TaskUpdate,
    parse_iso_date, parse_legacy_instance_id, parse_weekdays, update_task,
};
use tracing::info;

use crate::workspace::Workspace;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task id, or an occurrence address like `gym-2024-01-03`
    pub target: String,

    /// this | future | all (default: `this` for an occurrence, `all` otherwise)
    #[arg(long)]
    pub mode: Option<EditMode>,

    /// Occurrence date (YYYY-MM-DD) for `this` / `future`
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    /// Mark the occurrence skipped (`this` mode)
    #[arg(long, default_value_t = false)]
    pub skipped: bool,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub weight: Option<u32>,

    /// none | daily | weekly | custom
    #[arg(long)]
    pub cadence: Option<CadenceKind>,

    /// Weekly days, e.g. Mon,Wed
    #[arg(long)]
    pub days: Option<String>,

    /// Custom cadence interval in days
    #[arg(long)]
    pub interval: Option<i64>,

    #[arg(long)]
    pub start_date: Option<String>,

    #[arg(long)]
    pub end_date: Option<String>,
}

impl EditArgs {
    pub fn to_update(&self) -> Result<TaskUpdate> {
        let patch = CadencePatch {
            cadence: self.cadence,
            days_of_week: self
                .days
                .as_deref()
                .map(parse_weekdays)
                .transpose()
                .map_err(anyhow::Error::msg)?,
            interval_days: self.interval,
            start_date: self.start_date.as_deref().map(parse_iso_date).transpose()?,
            end_date: self.end_date.as_deref().map(parse_iso_date).transpose()?,
        };

        Ok(TaskUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            weight: self.weight,
            status: self.status,
            skipped: self.skipped.then_some(true),
            cadence: (!patch.is_empty()).then_some(patch),
            ..TaskUpdate::default()
        })
    }
}

/// Resolve `target` + `--date` into (task id, occurrence date).
///
/// An explicit `--date` wins; otherwise an id that isn't a known task is tried
/// as a `<task>-<YYYY-MM-DD>` occurrence address.
pub fn resolve_target(ws: &Workspace, target: &str, date: Option<&str>) -> Result<(String, Option<NaiveDate>)> {
    let explicit = date.map(parse_iso_date).transpose()?;
    if ws.task(target).is_some() {
        return Ok((target.to_string(), explicit));
    }
    match parse_legacy_instance_id(target) {
        Some(InstanceKey { base_id, date }) if ws.task(&base_id).is_some() => {
            Ok((base_id, explicit.or(Some(date))))
        }
        _ => bail!("unknown task: {target}"),
    }
}

/// Pick the edit mode. Without `--mode`, an addressed occurrence is edited
/// alone and a bare task id edits the whole series. `all` never takes a date.
pub fn resolve_mode(mode: Option<EditMode>, date: Option<NaiveDate>) -> Result<EditMode> {
    match (mode, date) {
        (Some(EditMode::All), Some(date)) => bail!(
            "--mode all edits every occurrence but an occurrence date ({date}) was given; \
             use --mode this|future or address the task by id"
        ),
        (Some(mode), _) => Ok(mode),
        (None, Some(_)) => Ok(EditMode::This),
        (None, None) => Ok(EditMode::All),
    }
}

pub fn run<S: TaskStore>(store: &mut S, ws: &Workspace, args: &EditArgs) -> Result<()> {
    let (task_id, date) = resolve_target(ws, &args.target, args.date.as_deref())?;
    let mode = resolve_mode(args.mode, date)?;
    let updates = args.to_update()?;
    let updated = update_task(store, &task_id, &updates, mode, date)?;

    info!(task_id = %updated.id, %mode, "task updated");
    println!(
        "Updated {} (mode {}, revision {}, {} overrides)",
        updated.id,
        mode,
        updated.revision,
        updated.overrides.len()
    );
    Ok(())
}
