use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::{Task, TrackedTask, TrackingInterval};
use crate::repo::is_unique_violation;

/// Tracking interval repository for database operations
///
/// Rows are always returned joined to their task so callers can print
/// names without a second lookup.
pub struct IntervalRepo;

impl IntervalRepo {
    /// Open a new interval at the given instant.
    ///
    /// Two intervals can never start at the same instant (UNIQUE
    /// start_ts); hitting that constraint is a hard failure rather than
    /// something callers recover from.
    pub fn insert_open(conn: &Connection, task_id: i64, start_ts: i64) -> Result<TrackingInterval> {
        conn.execute(
            "INSERT INTO intervals (task_id, start_ts, end_ts) VALUES (?1, ?2, NULL)",
            rusqlite::params![task_id, start_ts],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                anyhow::anyhow!("an interval already starts at instant {}", start_ts)
            } else {
                anyhow::Error::new(e)
                    .context(format!("Failed to open interval for task {}", task_id))
            }
        })?;

        let id = conn.last_insert_rowid();
        Ok(TrackingInterval {
            id: Some(id),
            task_id,
            start_ts,
            end_ts: None,
        })
    }

    /// All open intervals with their tasks, ordered by task name.
    pub fn list_open(conn: &Connection) -> Result<Vec<TrackedTask>> {
        let mut stmt = conn.prepare(
            "SELECT i.id, i.task_id, i.start_ts, i.end_ts,
                    t.name, t.description, t.created_ts, t.modified_ts
             FROM intervals i
             JOIN tasks t ON t.id = i.task_id
             WHERE i.end_ts IS NULL
             ORDER BY t.name",
        )?;

        let rows = stmt.query_map([], tracked_from_row)?;

        let mut tracked = Vec::new();
        for row in rows {
            tracked.push(row?);
        }
        Ok(tracked)
    }

    /// Close every open interval at the given instant and return them,
    /// end times filled in. Returns an empty vec when nothing was open.
    pub fn close_all_open(conn: &Connection, end_ts: i64) -> Result<Vec<TrackedTask>> {
        let mut open = Self::list_open(conn)?;
        if open.is_empty() {
            return Ok(open);
        }

        conn.execute(
            "UPDATE intervals SET end_ts = ?1 WHERE end_ts IS NULL",
            rusqlite::params![end_ts],
        )
        .context("Failed to close open intervals")?;

        for tracked in &mut open {
            tracked.interval.end_ts = Some(end_ts);
        }
        Ok(open)
    }

    /// Closed intervals whose start instant falls in the half-open UTC
    /// range `[start_ts, end_ts)`, optionally restricted to one task,
    /// ordered by start. Open intervals never appear.
    pub fn list_closed_between(
        conn: &Connection,
        start_ts: i64,
        end_ts: i64,
        task_id: Option<i64>,
    ) -> Result<Vec<TrackedTask>> {
        let mut tracked = Vec::new();

        match task_id {
            Some(id) => {
                let mut stmt = conn.prepare(
                    "SELECT i.id, i.task_id, i.start_ts, i.end_ts,
                            t.name, t.description, t.created_ts, t.modified_ts
                     FROM intervals i
                     JOIN tasks t ON t.id = i.task_id
                     WHERE i.end_ts IS NOT NULL
                       AND i.start_ts >= ?1 AND i.start_ts < ?2
                       AND i.task_id = ?3
                     ORDER BY i.start_ts",
                )?;
                let rows = stmt.query_map(rusqlite::params![start_ts, end_ts, id], tracked_from_row)?;
                for row in rows {
                    tracked.push(row?);
                }
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT i.id, i.task_id, i.start_ts, i.end_ts,
                            t.name, t.description, t.created_ts, t.modified_ts
                     FROM intervals i
                     JOIN tasks t ON t.id = i.task_id
                     WHERE i.end_ts IS NOT NULL
                       AND i.start_ts >= ?1 AND i.start_ts < ?2
                     ORDER BY i.start_ts",
                )?;
                let rows = stmt.query_map(rusqlite::params![start_ts, end_ts], tracked_from_row)?;
                for row in rows {
                    tracked.push(row?);
                }
            }
        }

        Ok(tracked)
    }
}

fn tracked_from_row(row: &rusqlite::Row) -> rusqlite::Result<TrackedTask> {
    let task_id: i64 = row.get(1)?;
    Ok(TrackedTask {
        interval: TrackingInterval {
            id: Some(row.get(0)?),
            task_id,
            start_ts: row.get(2)?,
            end_ts: row.get(3)?,
        },
        task: Task {
            id: Some(task_id),
            name: row.get(4)?,
            description: row.get(5)?,
            created_ts: row.get(6)?,
            modified_ts: row.get(7)?,
        },
    })
}
