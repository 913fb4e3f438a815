//! Hours aggregation.
//!
//! Builds the per-day report from closed intervals: every interval is
//! bucketed under the local calendar day it started on and summed per
//! task. Nothing here is persisted; rows are derived fresh on every run.

pub mod export;

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use log::debug;
use rusqlite::Connection;

use crate::error::TrackerError;
use crate::models::ReportRow;
use crate::repo::{IntervalRepo, TaskRepo};
use crate::utils::clock;

/// Reporting window in local calendar days. `end` is inclusive and
/// defaults to today.
#[derive(Debug, Clone, Copy)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl ReportWindow {
    /// The inclusive last day of the window once defaults are applied.
    pub fn end_or_today(&self) -> NaiveDate {
        self.end.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Validate the window and resolve it to a half-open UTC instant
    /// range. Rejected windows never reach storage.
    fn resolve(&self) -> Result<(i64, i64)> {
        let now = Local::now();

        let start_dt = self
            .start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("invalid start date {}", self.start))?;
        if start_dt >= now.naive_local() {
            return Err(TrackerError::InvalidRequest(format!(
                "start date {} must be earlier than now",
                self.start
            ))
            .into());
        }

        let end = self.end_or_today();
        if end < self.start {
            return Err(TrackerError::InvalidRequest(format!(
                "last date {} is earlier than start date {}",
                end, self.start
            ))
            .into());
        }

        clock::local_day_bounds_utc(self.start, end)
    }
}

/// Aggregate closed intervals into per-day, per-task hour totals.
///
/// An interval counts toward the local day it started on, in full, even
/// when it ran past midnight or past the window's upper bound. Rows come
/// back newest day first, tasks in name order within a day.
pub fn aggregate(
    conn: &Connection,
    window: ReportWindow,
    task_filter: Option<&str>,
) -> Result<Vec<ReportRow>> {
    let (lo, hi) = window.resolve()?;

    let task = match task_filter {
        Some(name) => Some(
            TaskRepo::find_by_name(conn, name)?
                .ok_or_else(|| TrackerError::NotFound(name.to_string()))?,
        ),
        None => None,
    };
    let task_id = task.as_ref().and_then(|t| t.id);

    let intervals = IntervalRepo::list_closed_between(conn, lo, hi, task_id)?;
    debug!(
        "{} closed interval(s) in UTC range [{}, {})",
        intervals.len(),
        lo,
        hi
    );

    let mut buckets: BTreeMap<(NaiveDate, String), ReportRow> = BTreeMap::new();
    for tracked in &intervals {
        // Closed by the query, so hours is always present
        let hours = tracked.interval.hours().unwrap_or(0.0);
        let date = clock::local_date_of(tracked.interval.start_ts);
        buckets
            .entry((date, tracked.task.name.clone()))
            .and_modify(|row| row.hours += hours)
            .or_insert_with(|| ReportRow {
                date,
                task: tracked.task.name.clone(),
                hours,
                description: tracked.task.description.clone(),
            });
    }

    let mut rows: Vec<ReportRow> = buckets.into_values().collect();
    rows.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.task.to_lowercase().cmp(&b.task.to_lowercase()))
    });
    Ok(rows)
}

/// Render decimal hours as a wall-clock `HH:MM` string.
///
/// A day bucket holding 24 hours or more has no clock rendering and
/// yields `None`; callers decide how to mark it.
pub fn clock_hhmm(hours: f64) -> Option<String> {
    if !hours.is_finite() || hours < 0.0 || hours >= 24.0 {
        return None;
    }
    let whole = hours as i64;
    let minutes = ((hours - whole as f64) * 60.0) as i64;
    Some(format!("{:02}:{:02}", whole, minutes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;
    use crate::models::Task;
    use crate::repo::{RegisterOutcome, TaskRepo};
    use crate::tracking;
    use chrono::NaiveDate;

    fn create_task(conn: &Connection, name: &str, description: Option<&str>) -> Task {
        match TaskRepo::create(conn, name, description).unwrap() {
            RegisterOutcome::Created(task) => task,
            RegisterOutcome::DuplicateName => panic!("unexpected duplicate for '{}'", name),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Seed one closed interval starting at a local wall-clock time.
    fn seed(conn: &Connection, task: &Task, date: NaiveDate, hour: u32, secs: i64) {
        let local = date.and_hms_opt(hour, 0, 0).unwrap();
        let start_ts = clock::to_utc(local).unwrap().timestamp();
        tracking::start(conn, task, start_ts).unwrap();
        tracking::stop_all(conn, start_ts + secs).unwrap();
    }

    fn window(start: NaiveDate, end: NaiveDate) -> ReportWindow {
        ReportWindow {
            start,
            end: Some(end),
        }
    }

    #[test]
    fn test_single_interval_reports_its_hours() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let task = create_task(&conn, "writing", Some("blog post"));

        // 09:00 to 11:30 local
        seed(&conn, &task, day(2024, 1, 1), 9, 9000);

        let rows = aggregate(&conn, window(day(2024, 1, 1), day(2024, 1, 1)), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day(2024, 1, 1));
        assert_eq!(rows[0].task, "writing");
        assert!((rows[0].hours - 2.5).abs() < 1e-9);
        assert_eq!(rows[0].description.as_deref(), Some("blog post"));
    }

    #[test]
    fn test_same_day_intervals_sum() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let task = create_task(&conn, "writing", None);

        seed(&conn, &task, day(2024, 1, 1), 9, 3600);
        seed(&conn, &task, day(2024, 1, 1), 13, 1800);

        let rows = aggregate(&conn, window(day(2024, 1, 1), day(2024, 1, 1)), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].hours - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_rows_ordered_newest_day_first_then_name() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let alpha = create_task(&conn, "alpha", None);
        let beta = create_task(&conn, "beta", None);

        seed(&conn, &alpha, day(2024, 1, 1), 9, 3600);
        seed(&conn, &beta, day(2024, 1, 2), 9, 3600);
        seed(&conn, &alpha, day(2024, 1, 2), 11, 3600);

        let rows = aggregate(&conn, window(day(2024, 1, 1), day(2024, 1, 2)), None).unwrap();
        let keys: Vec<(NaiveDate, &str)> = rows.iter().map(|r| (r.date, r.task.as_str())).collect();
        assert_eq!(
            keys,
            vec![
                (day(2024, 1, 2), "alpha"),
                (day(2024, 1, 2), "beta"),
                (day(2024, 1, 1), "alpha"),
            ]
        );
    }

    #[test]
    fn test_midnight_crossing_counts_toward_start_day() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let task = create_task(&conn, "writing", None);

        // 23:00 to 01:00 the next day
        seed(&conn, &task, day(2024, 1, 1), 23, 7200);

        let rows = aggregate(&conn, window(day(2024, 1, 1), day(2024, 1, 2)), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day(2024, 1, 1));
        assert!((rows[0].hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_interval_is_excluded() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let task = create_task(&conn, "writing", None);

        seed(&conn, &task, day(2024, 1, 1), 9, 3600);
        // Leave a second interval open
        let local = day(2024, 1, 1).and_hms_opt(14, 0, 0).unwrap();
        let start_ts = clock::to_utc(local).unwrap().timestamp();
        tracking::start(&conn, &task, start_ts).unwrap();

        let rows = aggregate(&conn, window(day(2024, 1, 1), day(2024, 1, 1)), None).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].hours - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_yields_no_rows() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let task = create_task(&conn, "writing", None);
        seed(&conn, &task, day(2024, 1, 1), 9, 3600);

        let rows = aggregate(&conn, window(day(2024, 2, 1), day(2024, 2, 1)), None).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_future_start_is_rejected_before_storage() {
        let conn = DbConnection::connect_in_memory().unwrap();

        let err = aggregate(&conn, window(day(2999, 1, 1), day(2999, 1, 2)), None).unwrap_err();
        let tracker_err = err.downcast_ref::<TrackerError>().unwrap();
        assert!(matches!(tracker_err, TrackerError::InvalidRequest(_)));
        assert!(err.to_string().contains("must be earlier than now"));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let conn = DbConnection::connect_in_memory().unwrap();

        let err = aggregate(&conn, window(day(2024, 1, 2), day(2024, 1, 1)), None).unwrap_err();
        let tracker_err = err.downcast_ref::<TrackerError>().unwrap();
        assert!(matches!(tracker_err, TrackerError::InvalidRequest(_)));
    }

    #[test]
    fn test_unknown_task_filter_is_not_found() {
        let conn = DbConnection::connect_in_memory().unwrap();

        let err = aggregate(
            &conn,
            window(day(2024, 1, 1), day(2024, 1, 1)),
            Some("ghost"),
        )
        .unwrap_err();
        let tracker_err = err.downcast_ref::<TrackerError>().unwrap();
        assert!(matches!(tracker_err, TrackerError::NotFound(_)));
    }

    #[test]
    fn test_task_filter_matches_case_insensitively() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let writing = create_task(&conn, "Writing", None);
        let editing = create_task(&conn, "editing", None);

        seed(&conn, &writing, day(2024, 1, 1), 9, 3600);
        seed(&conn, &editing, day(2024, 1, 1), 11, 3600);

        let rows = aggregate(
            &conn,
            window(day(2024, 1, 1), day(2024, 1, 1)),
            Some("wriTING"),
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        // Rows carry the registered spelling
        assert_eq!(rows[0].task, "Writing");
    }

    #[test]
    fn test_clock_hhmm() {
        assert_eq!(clock_hhmm(0.0).as_deref(), Some("00:00"));
        assert_eq!(clock_hhmm(1.5).as_deref(), Some("01:30"));
        assert_eq!(clock_hhmm(2.5).as_deref(), Some("02:30"));
        assert_eq!(clock_hhmm(23.983333333).as_deref(), Some("23:58"));
        assert_eq!(clock_hhmm(24.0), None);
        assert_eq!(clock_hhmm(30.25), None);
        assert_eq!(clock_hhmm(-1.0), None);
        assert_eq!(clock_hhmm(f64::NAN), None);
    }
}
