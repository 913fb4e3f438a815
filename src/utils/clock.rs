// Local/UTC boundary for the tracker.
//
// Storage holds Unix timestamps (UTC seconds) only; everything the user
// types or reads is local wall-clock time. Every conversion between the
// two goes through this module.

use anyhow::Result;
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Interpret a naive local wall-clock time as a UTC instant.
///
/// During a DST fall-back the wall-clock time occurs twice; the earlier
/// instant is used. During a spring-forward gap it never occurs and the
/// conversion fails.
pub fn to_utc(local: NaiveDateTime) -> Result<DateTime<Utc>> {
    match Local.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            anyhow::bail!("local time {} does not exist (DST gap)", local)
        }
    }
}

/// Render a UTC instant in the local timezone.
pub fn to_local(utc: DateTime<Utc>) -> DateTime<Local> {
    utc.with_timezone(&Local)
}

/// The local calendar day a stored timestamp falls on.
pub fn local_date_of(ts: i64) -> NaiveDate {
    let utc = DateTime::from_timestamp(ts, 0).unwrap_or(DateTime::UNIX_EPOCH);
    to_local(utc).date_naive()
}

/// UTC instant range covering the local days `start..=end`, as a half-open
/// `[start_ts, end_ts)` pair of Unix timestamps. The upper bound is local
/// midnight of the day after `end`.
pub fn local_day_bounds_utc(start: NaiveDate, end: NaiveDate) -> Result<(i64, i64)> {
    let start_dt = start
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid start date {}", start))?;
    let after_end = end
        .succ_opt()
        .ok_or_else(|| anyhow::anyhow!("end date {} is out of range", end))?;
    let end_dt = after_end
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid end date {}", end))?;
    Ok((to_utc(start_dt)?.timestamp(), to_utc(end_dt)?.timestamp()))
}
