// Output formatting utilities

use anyhow::Result;
use chrono::{DateTime, NaiveDate};

use crate::models::{ReportRow, Task, TrackedTask};
use crate::report;
use crate::utils::clock;

/// Local wall-clock rendering of a stored UTC instant, offset included.
pub fn format_instant(ts: i64) -> String {
    let utc = DateTime::from_timestamp(ts, 0).unwrap_or(DateTime::UNIX_EPOCH);
    clock::to_local(utc)
        .format("%Y-%m-%d %H:%M:%S %z")
        .to_string()
}

/// Print all tasks followed by whatever is currently being tracked.
pub fn print_task_list(tasks: &[Task], active: &[TrackedTask]) {
    println!("Tasks: Task Name (Task Description)");
    if tasks.is_empty() {
        println!("\tNone");
    } else {
        for task in tasks {
            match task.description.as_deref() {
                Some(desc) if !desc.is_empty() => println!("\t{} ({})", task.name, desc),
                _ => println!("\t{}", task.name),
            }
        }
    }

    println!("Active Task:");
    if active.is_empty() {
        println!("\tNone");
    } else {
        for tracked in active {
            println!(
                "\t{} (tracking since {})",
                tracked.task.name,
                format_instant(tracked.interval.start_ts)
            );
        }
    }
}

pub fn print_list_json(tasks: &[Task], active: &[TrackedTask]) -> Result<()> {
    let payload = serde_json::json!({
        "tasks": tasks
            .iter()
            .map(|t| serde_json::json!({
                "name": t.name,
                "description": t.description,
            }))
            .collect::<Vec<_>>(),
        "active": active
            .iter()
            .map(|t| serde_json::json!({
                "task": t.task.name,
                "start_ts": t.interval.start_ts,
                "tracking_since": format_instant(t.interval.start_ts),
            }))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// Print the hours report. Each line carries the decimal total and its
/// wall-clock rendering; totals of a full day or more have no clock form
/// and are flagged instead.
pub fn print_report(rows: &[ReportRow], task_label: Option<&str>, from: NaiveDate, to: NaiveDate) {
    match task_label {
        Some(name) => println!("Reporting on task '{}' from {} to {}", name, from, to),
        None => println!("Reporting all tasks from {} to {}", from, to),
    }

    if rows.is_empty() {
        println!("No work hours to report");
        return;
    }

    let name_width = rows.iter().map(|r| r.task.len()).max().unwrap_or(0);
    for row in rows {
        let clock_time = report::clock_hhmm(row.hours).unwrap_or_else(|| "over 24h".to_string());
        let desc = row
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        println!(
            "\t{}  {:<name_width$}  {:>6.2} Hours ({}){}",
            row.date, row.task, row.hours, clock_time, desc
        );
    }
}

pub fn print_report_json(rows: &[ReportRow]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}
