use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{Task, TaskPatch};
use crate::repo::is_unique_violation;

/// Result of an attempted task registration.
///
/// A name collision is an expected outcome, not a storage failure:
/// callers decide how to surface it.
#[derive(Debug)]
pub enum RegisterOutcome {
    Created(Task),
    DuplicateName,
}

/// Result of an attempted task edit.
#[derive(Debug, PartialEq)]
pub enum EditOutcome {
    Updated,
    DuplicateName,
}

/// Task repository for database operations
pub struct TaskRepo;

impl TaskRepo {
    /// Register a new task. Names collide case-insensitively.
    pub fn create(
        conn: &Connection,
        name: &str,
        description: Option<&str>,
    ) -> Result<RegisterOutcome> {
        let task = Task::new(name.to_string(), description.map(str::to_string));

        let inserted = conn.execute(
            "INSERT INTO tasks (name, description, created_ts, modified_ts) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![task.name, task.description, task.created_ts, task.modified_ts],
        );

        match inserted {
            Ok(_) => {
                let id = conn.last_insert_rowid();
                Ok(RegisterOutcome::Created(Task {
                    id: Some(id),
                    ..task
                }))
            }
            Err(e) if is_unique_violation(&e) => Ok(RegisterOutcome::DuplicateName),
            Err(e) => Err(e).with_context(|| format!("Failed to insert task '{}'", name)),
        }
    }

    /// Apply a patch to a stored task. Fields left `None` keep their
    /// stored value. The patch must have passed `TaskPatch::validate`
    /// before it reaches storage.
    pub fn update(conn: &Connection, task_id: i64, patch: &TaskPatch) -> Result<EditOutcome> {
        let now = chrono::Utc::now().timestamp();

        let updated = conn.execute(
            "UPDATE tasks
             SET name = COALESCE(?1, name),
                 description = COALESCE(?2, description),
                 modified_ts = ?3
             WHERE id = ?4",
            rusqlite::params![patch.name, patch.description, now, task_id],
        );

        match updated {
            Ok(_) => Ok(EditOutcome::Updated),
            Err(e) if is_unique_violation(&e) => Ok(EditOutcome::DuplicateName),
            Err(e) => Err(e).with_context(|| format!("Failed to update task {}", task_id)),
        }
    }

    /// Look a task up by name (case-insensitive). The returned task
    /// carries the name as registered, not as typed.
    pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Task>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_ts, modified_ts FROM tasks WHERE name = ?1",
        )?;

        stmt.query_row([name], task_from_row)
            .optional()
            .with_context(|| format!("Failed to look up task '{}'", name))
    }

    /// All tasks, ordered by name (case-insensitively, per the column
    /// collation).
    pub fn list(conn: &Connection) -> Result<Vec<Task>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, description, created_ts, modified_ts FROM tasks ORDER BY name",
        )?;

        let rows = stmt.query_map([], task_from_row)?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    /// Delete a task. Its tracking intervals go with it (ON DELETE
    /// CASCADE), so a single statement removes the task and its whole
    /// history atomically. Returns false when no such task existed.
    pub fn delete(conn: &Connection, task_id: i64) -> Result<bool> {
        let deleted = conn
            .execute("DELETE FROM tasks WHERE id = ?1", [task_id])
            .with_context(|| format!("Failed to delete task {}", task_id))?;
        Ok(deleted > 0)
    }
}

fn task_from_row(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        created_ts: row.get(3)?,
        modified_ts: row.get(4)?,
    })
}
