use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Task model
///
/// Names identify tasks everywhere in the CLI; uniqueness is
/// case-insensitive (NOCASE collation on the name column).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub created_ts: i64,
    pub modified_ts: i64,
}

impl Task {
    /// Create a new task, not yet persisted (id is None until insert)
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: None,
            name,
            description,
            created_ts: now,
            modified_ts: now,
        }
    }
}

/// Field-wise edit of a task. A `None` field leaves the stored value
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    /// Reject empty or self-contradictory edits before they reach storage.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.is_empty() {
            return Err(TrackerError::InvalidRequest(
                "nothing to change; provide a new name or a new description".to_string(),
            ));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(TrackerError::InvalidRequest(
                    "the task name cannot be cleared".to_string(),
                ));
            }
        }
        Ok(())
    }
}
