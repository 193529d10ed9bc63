use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Ensure the database file exists, run lazy migrations, and return a live
/// connection. Parent directories are created on first launch.
pub fn ensure_schema(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(db_path).context("failed to open SQLite database")?;
    create_tables(&conn)?;
    Ok(conn)
}

/// Schema setup shared by file-backed and in-memory connections.
pub(crate) fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )
    .context("failed to create kv table")?;

    Ok(())
}
