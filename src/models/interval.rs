use serde::{Deserialize, Serialize};

use crate::models::Task;

/// One tracking interval of a task
///
/// An interval with no end instant is open: its task is being tracked
/// right now. Both instants are Unix timestamps in UTC; a closed interval
/// covers the half-open range `[start_ts, end_ts)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingInterval {
    pub id: Option<i64>,
    pub task_id: i64,
    pub start_ts: i64,
    pub end_ts: Option<i64>,
}

impl TrackingInterval {
    pub fn is_open(&self) -> bool {
        self.end_ts.is_none()
    }

    /// Elapsed seconds; `None` while the interval is still open.
    pub fn duration_secs(&self) -> Option<i64> {
        self.end_ts.map(|end| end - self.start_ts)
    }

    /// Elapsed time in fractional hours; `None` while the interval is open.
    pub fn hours(&self) -> Option<f64> {
        self.duration_secs().map(|secs| secs as f64 / 3600.0)
    }
}

/// A task joined to one of its intervals: the open one when listing active
/// tracking, the just-closed one when reporting a stop.
#[derive(Debug, Clone)]
pub struct TrackedTask {
    pub task: Task,
    pub interval: TrackingInterval,
}
