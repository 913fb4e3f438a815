pub mod interval;
pub mod task;

pub use interval::*;
pub use task::*;

/// True when the error is a UNIQUE constraint violation, as opposed to
/// any other SQLite constraint (foreign key, CHECK).
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
