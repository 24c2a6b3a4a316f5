use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;

/// How long a statement waits on a lock held by another process before
/// giving up with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) the SQLite database at `path` and make sure the
/// tables exist.
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    let conn = Connection::open(path).context("failed to open SQLite database")?;
    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to configure busy timeout")?;
    ensure_schema(&conn)?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

/// Create any missing tables. Existing tables are never altered. Also toggles
/// `PRAGMA foreign_keys = ON` so transaction rows cannot point at equipment
/// that does not exist.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign keys")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS equipment (
            id TEXT PRIMARY KEY,
            name_en TEXT NOT NULL,
            name_ar TEXT,
            location TEXT,
            total_quantity INTEGER NOT NULL CHECK (total_quantity >= 0),
            available_quantity INTEGER NOT NULL
                CHECK (available_quantity >= 0 AND available_quantity <= total_quantity)
        )",
        [],
    )
    .context("failed to create equipment table")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            equipment_id TEXT NOT NULL REFERENCES equipment(id),
            user_name TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            action_type TEXT NOT NULL CHECK (action_type IN ('take', 'return')),
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
        [],
    )
    .context("failed to create transactions table")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_created_at ON transactions (created_at)",
        [],
    )
    .context("failed to create transactions index")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('equipment', 'transactions')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
    }

    #[test]
    fn check_constraint_rejects_overstock() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO equipment (id, name_en, total_quantity, available_quantity)
             VALUES ('x', 'Lantern', 2, 3)",
            [],
        );
        assert!(result.is_err());
    }
}
