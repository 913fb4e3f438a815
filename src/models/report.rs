use chrono::NaiveDate;
use serde::Serialize;

/// One line of the hours report: time worked on one task during one local
/// calendar day. Derived at report time, never persisted.
///
/// `date` is the local day the contributing intervals started on; an
/// interval that runs past midnight still counts in full toward its start
/// day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub task: String,
    pub hours: f64,
    pub description: Option<String>,
}
