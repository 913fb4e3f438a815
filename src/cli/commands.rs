use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use log::info;
use rusqlite::Connection;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::cli::output;
use crate::db::DbConnection;
use crate::error::TrackerError;
use crate::models::TaskPatch;
use crate::repo::{EditOutcome, RegisterOutcome, TaskRepo};
use crate::report::{self, ReportWindow};
use crate::tracking;

#[derive(Parser)]
#[command(name = "ttrack")]
#[command(about = "Track time spent on tasks and report hours worked per day")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// End tracking on the active task before doing anything else
    #[arg(short = 'e', long = "end", global = true)]
    pub end_tracking: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a new task
    Add {
        /// Task name (unique, case-insensitive)
        name: String,
        /// Task description
        #[arg(short = 'd', long = "desc")]
        description: Option<String>,
    },
    /// Change a task's name or description
    Edit {
        /// Current task name
        name: String,
        /// New task name
        #[arg(short = 'n', long = "name")]
        new_name: Option<String>,
        /// New task description
        #[arg(short = 'd', long = "desc")]
        new_description: Option<String>,
    },
    /// Delete a task together with its tracked time
    Delete {
        /// Task name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List tasks and show what is being tracked
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Start tracking a task, ending whatever was being tracked
    Track {
        /// Task name
        name: String,
    },
    /// Report hours worked per day
    Report {
        /// First date of the reporting window (YYYY-MM-DD)
        start_date: NaiveDate,
        /// Last date of the window, inclusive (defaults to today)
        #[arg(short = 'l', long = "last")]
        last_date: Option<NaiveDate>,
        /// Restrict the report to one task
        #[arg(short = 't', long = "task")]
        task: Option<String>,
        /// Also write the report to a CSV file
        #[arg(short = 'E', long = "export")]
        export: Option<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let conn = DbConnection::connect()?;

    // -e runs first so 'ttrack -e track other' ends cleanly even when the
    // rest of the invocation fails
    if cli.end_tracking {
        end_active_tracking(&conn)?;
    }

    match cli.command {
        Some(Commands::Add { name, description }) => {
            add_task(&conn, &name, description.as_deref())
        }
        Some(Commands::Edit {
            name,
            new_name,
            new_description,
        }) => edit_task(&conn, &name, new_name, new_description),
        Some(Commands::Delete { name, yes }) => delete_task(&conn, &name, yes),
        Some(Commands::List { json }) => list_tasks(&conn, json),
        Some(Commands::Track { name }) => track_task(&conn, &name),
        Some(Commands::Report {
            start_date,
            last_date,
            task,
            export,
            json,
        }) => report_hours(&conn, start_date, last_date, task, export, json),
        None => {
            if !cli.end_tracking {
                Cli::command()
                    .print_help()
                    .context("Failed to print help")?;
                println!();
            }
            Ok(())
        }
    }
}

fn end_active_tracking(conn: &Connection) -> Result<()> {
    let now = Utc::now().timestamp();
    let stopped = tracking::stop_all(conn, now)?;

    if stopped.is_empty() {
        println!("No active tasks found to end tracking on");
        return Ok(());
    }
    for tracked in &stopped {
        println!(
            "'{}' tracking ended {}",
            tracked.task.name,
            output::format_instant(now)
        );
    }
    Ok(())
}

fn add_task(conn: &Connection, name: &str, description: Option<&str>) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TrackerError::InvalidRequest(
            "the task name cannot be empty".to_string(),
        )
        .into());
    }
    match TaskRepo::create(conn, name, description)? {
        RegisterOutcome::Created(task) => {
            info!("task '{}' added", task.name);
            println!("Task '{}' added", task.name);
            Ok(())
        }
        RegisterOutcome::DuplicateName => Err(TrackerError::Duplicate(name.to_string()).into()),
    }
}

fn edit_task(
    conn: &Connection,
    name: &str,
    new_name: Option<String>,
    new_description: Option<String>,
) -> Result<()> {
    let patch = TaskPatch {
        name: new_name,
        description: new_description,
    };
    // Bad patches are rejected before the name is even looked up
    patch.validate()?;

    let task = TaskRepo::find_by_name(conn, name)?
        .ok_or_else(|| TrackerError::NotFound(name.to_string()))?;
    let task_id = task
        .id
        .ok_or_else(|| anyhow::anyhow!("task '{}' has no id", task.name))?;

    match TaskRepo::update(conn, task_id, &patch)? {
        EditOutcome::Updated => {
            info!("task '{}' updated", task.name);
            println!("Task '{}' updated", task.name);
            Ok(())
        }
        EditOutcome::DuplicateName => {
            Err(TrackerError::Duplicate(patch.name.clone().unwrap_or_default()).into())
        }
    }
}

fn delete_task(conn: &Connection, name: &str, assume_yes: bool) -> Result<()> {
    let task = TaskRepo::find_by_name(conn, name)?
        .ok_or_else(|| TrackerError::NotFound(name.to_string()))?;

    if !assume_yes && !confirm_delete(&task.name)? {
        println!("Task '{}' not deleted", task.name);
        return Ok(());
    }

    let task_id = task
        .id
        .ok_or_else(|| anyhow::anyhow!("task '{}' has no id", task.name))?;
    if !TaskRepo::delete(conn, task_id)? {
        return Err(TrackerError::NotFound(name.to_string()).into());
    }

    info!("task '{}' deleted with its tracking history", task.name);
    println!("Task '{}' deleted", task.name);
    Ok(())
}

/// Deleting a task takes its whole tracking history with it, so require
/// a typed CONFIRM unless -y was given.
fn confirm_delete(name: &str) -> Result<bool> {
    print!(
        "Deleting '{}' also deletes its tracked time. Type 'CONFIRM' to delete: ",
        name
    );
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read confirmation")?;
    Ok(line.trim() == "CONFIRM")
}

fn list_tasks(conn: &Connection, json: bool) -> Result<()> {
    let tasks = TaskRepo::list(conn)?;
    let active = tracking::active(conn)?;

    if json {
        output::print_list_json(&tasks, &active)
    } else {
        output::print_task_list(&tasks, &active);
        Ok(())
    }
}

fn track_task(conn: &Connection, name: &str) -> Result<()> {
    let task = TaskRepo::find_by_name(conn, name)?
        .ok_or_else(|| TrackerError::NotFound(name.to_string()))?;

    let now = Utc::now().timestamp();
    let outcome = tracking::start(conn, &task, now)?;

    for displaced in &outcome.superseded {
        println!(
            "'{}' tracking ended {}",
            displaced.task.name,
            output::format_instant(now)
        );
    }
    println!(
        "'{}' tracking started {}",
        outcome.started.task.name,
        output::format_instant(now)
    );
    Ok(())
}

fn report_hours(
    conn: &Connection,
    start_date: NaiveDate,
    last_date: Option<NaiveDate>,
    task: Option<String>,
    export: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let window = ReportWindow {
        start: start_date,
        end: last_date,
    };
    let rows = report::aggregate(conn, window, task.as_deref())?;

    if json {
        output::print_report_json(&rows)?;
    } else {
        // Header shows the registered spelling, not what was typed
        let label = match task.as_deref() {
            Some(name) => TaskRepo::find_by_name(conn, name)?.map(|t| t.name),
            None => None,
        };
        output::print_report(&rows, label.as_deref(), start_date, window.end_or_today());
    }

    if let Some(path) = export {
        if rows.is_empty() {
            return Ok(());
        }
        report::export::export_csv(&rows, &path)?;
        println!("Report exported to {}", path.display());
    }
    Ok(())
}
