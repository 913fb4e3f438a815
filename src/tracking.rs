//! Tracking state machine.
//!
//! At most one task is tracked at a time. Starting a task closes whatever
//! was running and opens the new interval inside one transaction, so no
//! observer ever sees two open intervals or a gap between the old end and
//! the new start.

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

use crate::models::{Task, TrackedTask};
use crate::repo::IntervalRepo;

/// What `start` did: the new open tracking plus whatever it displaced.
#[derive(Debug)]
pub struct StartOutcome {
    pub started: TrackedTask,
    pub superseded: Vec<TrackedTask>,
}

/// Begin tracking a task at the given UTC instant.
///
/// Any open interval (including one on the same task) is closed at that
/// same instant, so the displaced tracking ends exactly where the new one
/// begins. Close and open commit together or not at all.
pub fn start(conn: &Connection, task: &Task, at_utc: i64) -> Result<StartOutcome> {
    let task_id = task
        .id
        .ok_or_else(|| anyhow::anyhow!("task '{}' has no id", task.name))?;

    let tx = conn
        .unchecked_transaction()
        .context("Failed to begin tracking transaction")?;

    let superseded = IntervalRepo::close_all_open(&tx, at_utc)?;
    let interval = IntervalRepo::insert_open(&tx, task_id, at_utc)?;

    tx.commit().context("Failed to commit tracking switch")?;

    info!("tracking started for '{}' at {}", task.name, at_utc);
    for displaced in &superseded {
        debug!(
            "tracking ended for '{}' at {}",
            displaced.task.name, at_utc
        );
    }

    Ok(StartOutcome {
        started: TrackedTask {
            task: task.clone(),
            interval,
        },
        superseded,
    })
}

/// End all active tracking at the given UTC instant.
///
/// Idempotent: with nothing active this changes nothing and returns an
/// empty vec.
pub fn stop_all(conn: &Connection, at_utc: i64) -> Result<Vec<TrackedTask>> {
    let tx = conn
        .unchecked_transaction()
        .context("Failed to begin stop transaction")?;
    let stopped = IntervalRepo::close_all_open(&tx, at_utc)?;
    tx.commit().context("Failed to commit stop")?;

    if stopped.is_empty() {
        debug!("no active tracking to stop");
    }
    for tracked in &stopped {
        info!("tracking ended for '{}' at {}", tracked.task.name, at_utc);
    }
    Ok(stopped)
}

/// Tasks currently being tracked, with their open intervals, ordered by
/// task name.
pub fn active(conn: &Connection) -> Result<Vec<TrackedTask>> {
    IntervalRepo::list_open(conn)
}
