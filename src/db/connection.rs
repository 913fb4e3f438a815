use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::db::migrations::MigrationManager;

/// Database connection manager
pub struct DbConnection;

impl DbConnection {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".ttrack").join("tracking.db")
    }

    /// Get database path from configuration file or default
    pub fn resolve_path() -> Result<PathBuf> {
        let config_path = Self::config_path();

        if config_path.exists() {
            if let Ok(config) = std::fs::read_to_string(&config_path) {
                let config_dir = config_path.parent().unwrap_or(Path::new(""));
                if let Some(path) = path_from_config(&config, config_dir) {
                    return Ok(path);
                }
            }
        }

        Ok(Self::default_path())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".ttrack").join("rc")
    }

    /// Connect to the database, creating it and parent directories if needed
    pub fn connect() -> Result<Connection> {
        let db_path = Self::resolve_path()?;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        log::debug!("opened database at {}", db_path.display());

        Self::prepare(&conn)?;
        Ok(conn)
    }

    /// Connect to an in-memory database (for testing)
    pub fn connect_in_memory() -> Result<Connection> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::prepare(&conn)?;
        Ok(conn)
    }

    fn prepare(conn: &Connection) -> Result<()> {
        // SQLite scopes this pragma to the connection; cascade deletes
        // rely on it
        conn.execute("PRAGMA foreign_keys=ON", [])
            .context("Failed to enable foreign key enforcement")?;
        MigrationManager::initialize(conn).context("Failed to initialize database schema")?;
        Ok(())
    }
}

/// Extract the data.location value from rc file contents, resolving
/// relative paths against the config file's directory.
fn path_from_config(config: &str, config_dir: &Path) -> Option<PathBuf> {
    for line in config.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("data.location=") {
            let path = PathBuf::from(value.trim());
            if path.is_relative() {
                return Some(config_dir.join(path));
            }
            return Some(path);
        }
    }
    None
}
