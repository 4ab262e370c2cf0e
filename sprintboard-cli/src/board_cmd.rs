use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use sprintboard_core::{
    Board, BoardItem, DateWindow, Sprint, Task, TaskStatus, collect_items, generate, overdue,
    parse_iso_date, to_iso_date, today_in, upcoming,
};

use crate::config::Config;
use crate::workspace::Workspace;

/// Resolve the window: a named sprint, or explicit `--from/--to` (plain tasks
/// are only pulled in for a named sprint).
pub fn resolve_window(
    ws: &Workspace,
    sprint: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(DateWindow, Option<Sprint>)> {
    if let Some(id) = sprint {
        let s = ws
            .sprint(id)
            .with_context(|| format!("unknown sprint: {id}"))?;
        return Ok((s.window, Some(s.clone())));
    }
    match (from, to) {
        (Some(a), Some(b)) => Ok((DateWindow::new(parse_iso_date(a)?, parse_iso_date(b)?)?, None)),
        _ => bail!("pass --sprint <id> or both --from and --to"),
    }
}

pub fn show_board(ws: &Workspace, cfg: &Config, window: DateWindow, sprint: Option<&Sprint>) -> Result<()> {
    let items = collect_items(&ws.tasks, &window, sprint.map(|s| s.id.as_str()));
    let today = today_in(&cfg.general.timezone)?;
    let late: Vec<BoardItem> = overdue(&items, today).into_iter().cloned().collect();
    let board = Board::from_items(items);

    match sprint {
        Some(s) => println!("# {} ({} .. {})\n", s.name, s.window.start(), s.window.end()),
        None => println!("# {} .. {}\n", window.start(), window.end()),
    }

    for status in TaskStatus::ALL {
        let col = board.column(status);
        println!(
            "## {} ({} items, weight {})",
            status,
            col.len(),
            board.weight_by_status.get(&status).copied().unwrap_or(0)
        );
        for item in col {
            println!("- {}", item_line(item));
        }
        println!();
    }

    if cfg.board.show_skipped && !board.skipped.is_empty() {
        println!("## skipped ({})", board.skipped.len());
        for item in &board.skipped {
            println!("- {}", item_line(item));
        }
        println!();
    }

    println!(
        "Progress: {}/{} weight ({:.1}%)",
        board.completed_weight,
        board.total_weight,
        board.completion_percent()
    );

    if !late.is_empty() {
        println!("\nOverdue as of {}:", to_iso_date(today));
        for item in &late {
            println!("- {}", item_line(item));
        }
    }

    Ok(())
}

/// How far `instances` looks for the next occurrence.
const NEXT_OCCURRENCE_HORIZON_DAYS: u64 = 366;

pub fn show_instances(ws: &Workspace, task_id: &str, window: DateWindow, today: NaiveDate) -> Result<()> {
    let task = ws
        .task(task_id)
        .with_context(|| format!("unknown task: {task_id}"))?;
    if !task.is_recurring() {
        println!("{} is not recurring (status {})", task.id, task.status);
        return Ok(());
    }
    let out = generate(task, &window);
    println!("{} occurrences of {} in {} .. {}", out.len(), task.id, window.start(), window.end());
    for i in out {
        println!("- {}", item_line(&BoardItem::Instance(i)));
    }
    match next_occurrence(task, today) {
        Some(next) => println!("Next: {}", to_iso_date(next)),
        None => println!("Next: none within {NEXT_OCCURRENCE_HORIZON_DAYS} days of {}", to_iso_date(today)),
    }
    Ok(())
}

pub fn next_occurrence(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    task.cadence
        .as_ref()?
        .next_on_or_after(today, NEXT_OCCURRENCE_HORIZON_DAYS)
}

pub fn show_upcoming(ws: &Workspace, today: NaiveDate, days: u64) -> Result<()> {
    let items = upcoming(&ws.tasks, today, days);
    println!("Upcoming ({} days from {}):", days, to_iso_date(today));
    if items.is_empty() {
        println!("(nothing scheduled)");
    }
    for item in &items {
        println!("- {}", item_line(item));
    }
    Ok(())
}

fn item_line(item: &BoardItem) -> String {
    let mut line = format!("[{}] {} (w{})", item.status(), item.title(), item.weight());
    match item {
        BoardItem::Instance(i) => {
            line.push_str(&format!(" | {}", i.key));
            if i.modified {
                line.push_str(" *");
            }
            if i.skipped {
                line.push_str(" (skipped)");
            }
        }
        BoardItem::Plain(t) => {
            line.push_str(&format!(" | {}", t.id));
            if let Some(due) = t.due_date {
                line.push_str(&format!(" due {}", to_iso_date(due)));
            }
        }
    }
    line
}
