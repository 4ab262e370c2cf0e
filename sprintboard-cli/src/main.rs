use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sprintboard_core::{DateWindow, Sprint, parse_iso_date, today_in};
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod board_cmd;
mod config;
mod edit_cmd;
mod state;
mod workspace;

use config::{init_config, load_config};
use workspace::{JsonFileStore, Workspace};

#[derive(Parser, Debug)]
#[command(
    name = "sprintboard",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SPRINTBOARD_BUILD_SHA"), ")"),
    about = "Sprint board with recurring tasks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create ~/.sprintboard with a default config and an empty workspace
    Init,

    /// Config helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Sprint management
    Sprint {
        #[command(subcommand)]
        command: SprintCommand,
    },

    /// Show the board for a sprint (or an explicit window)
    Board {
        #[arg(long)]
        sprint: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },

    /// List generated occurrences of one recurring task
    Instances {
        task_id: String,
        #[arg(long)]
        sprint: Option<String>,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },

    /// Occurrences coming up from today
    Upcoming {
        /// Days to look ahead (default: config.board.upcoming_days)
        #[arg(long)]
        days: Option<u64>,
    },

    /// Edit a task or one of its occurrences
    Edit(edit_cmd::EditArgs),

    /// Print the workspace JSON to stdout
    Export,

    /// Replace the workspace with a JSON document
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.sprintboard/config.toml with defaults (if missing)
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum SprintCommand {
    /// Add a sprint window
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// List sprints
    List,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SPRINTBOARD_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "sprintboard=debug,sprintboard_core=debug,info"
        } else {
            "sprintboard=info,warn"
        })
    });

    let format = env::var("SPRINTBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let cfg = load_config()?;
    let mut store = JsonFileStore::new(state::workspace_path(&cfg)?);

    match cli.command {
        Command::Init => {
            init_config()?;
            if store.path().exists() {
                println!("Workspace already exists: {}", store.path().display());
            } else {
                store.save(&Workspace::default())?;
                println!("Wrote {}", store.path().display());
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => init_config()?,
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("{s}");
            }
        },

        Command::Sprint { command } => match command {
            SprintCommand::Add { id, name, start, end } => {
                let mut ws = store.load()?;
                if ws.sprint(&id).is_some() {
                    bail!("sprint already exists: {id}");
                }
                let window = DateWindow::new(parse_iso_date(&start)?, parse_iso_date(&end)?)?;
                ws.sprints.push(Sprint::new(id.clone(), name, window));
                store.save(&ws)?;
                info!(sprint_id = %id, "sprint added");
                println!("Added sprint {id} ({} .. {})", window.start(), window.end());
            }
            SprintCommand::List => {
                let ws = store.load()?;
                for s in &ws.sprints {
                    println!("{}\t{}\t{} .. {}", s.id, s.name, s.window.start(), s.window.end());
                }
            }
        },

        Command::Board { sprint, from, to } => {
            let ws = store.load()?;
            let (window, sprint) =
                board_cmd::resolve_window(&ws, sprint.as_deref(), from.as_deref(), to.as_deref())?;
            board_cmd::show_board(&ws, &cfg, window, sprint.as_ref())?;
        }

        Command::Instances {
            task_id,
            sprint,
            from,
            to,
        } => {
            let ws = store.load()?;
            let (window, _) =
                board_cmd::resolve_window(&ws, sprint.as_deref(), from.as_deref(), to.as_deref())?;
            let today = today_in(&cfg.general.timezone)?;
            board_cmd::show_instances(&ws, &task_id, window, today)?;
        }

        Command::Upcoming { days } => {
            let ws = store.load()?;
            let today = today_in(&cfg.general.timezone)?;
            board_cmd::show_upcoming(&ws, today, days.unwrap_or(cfg.board.upcoming_days))?;
        }

        Command::Edit(args) => {
            let ws = store.load()?;
            edit_cmd::run(&mut store, &ws, &args)?;
        }

        Command::Export => {
            let ws = store.load()?;
            println!("{}", ws.to_json()?);
        }

        Command::Import { file } => {
            let s = fs::read_to_string(&file).with_context(|| format!("read {}", file.display()))?;
            let ws = Workspace::parse(&s).with_context(|| format!("import {}", file.display()))?;
            store.save(&ws)?;
            info!(tasks = ws.tasks.len(), sprints = ws.sprints.len(), "workspace imported");
            println!(
                "Imported {} tasks and {} sprints into {}",
                ws.tasks.len(),
                ws.sprints.len(),
                store.path().display()
            );
        }
    }

    Ok(())
}
