//! CSV export of report rows.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::models::ReportRow;

const CSV_HEADER: &str = "Report Date,Task,Hours Worked,Description";

/// Write report rows to a CSV file, creating parent directories as
/// needed. One line per row, same order as the printed report.
pub fn export_csv(rows: &[ReportRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&format!(
            "{},{},{:.1},{}\n",
            row.date,
            csv_field(&row.task),
            row.hours,
            csv_field(row.description.as_deref().unwrap_or("")),
        ));
    }

    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("report exported to {}", path.display());
    Ok(())
}

/// Quote a field when it contains a comma, quote, or newline; embedded
/// quotes are doubled.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
