//! Database schema migrations for campushub.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration
//! version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    // Ensure schema_version table exists
    create_schema_version_table(conn)?;

    // Get current version
    let current_version = get_schema_version(conn);

    // Apply migrations sequentially
    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            0
        } else {
            eprintln!("Warning: failed to read schema_version: {}", e);
            0
        }
    })
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: Initial schema (baseline).
///
/// This migration represents the original CRUD schema before any
/// migrations were tracked. It's a no-op since the tables are created by
/// PortalDb::migrate() directly.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    // Mark as v1 (tables already exist)
    set_schema_version(conn, 1)?;
    Ok(())
}

/// Migration v2: Add allocation-engine bookkeeping to tasks.
///
/// Adds:
/// - assigned_name: denormalized assignee display name
/// - ai_assigned: 1 when the assignment was produced by the engine
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE tasks ADD COLUMN assigned_name TEXT;
         ALTER TABLE tasks ADD COLUMN ai_assigned INTEGER NOT NULL DEFAULT 0;",
    )?;

    // Mark as v2
    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [2])?;

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_v1_tasks_table(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE tasks (
                id              TEXT PRIMARY KEY,
                event_id        TEXT NOT NULL,
                team_id         TEXT NOT NULL,
                title           TEXT NOT NULL,
                description     TEXT,
                required_skills TEXT NOT NULL DEFAULT '[]',
                priority        TEXT NOT NULL DEFAULT 'medium',
                assigned_to     TEXT,
                completed       INTEGER NOT NULL DEFAULT 0,
                due_at          TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );",
        )
        .unwrap();
    }

    /// Test migration from scratch (v0 -> v2)
    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        create_v1_tasks_table(&conn);

        conn.execute(
            "INSERT INTO tasks (id, event_id, team_id, title, created_at, updated_at)
             VALUES ('task1', 'e1', 't1', 'Old task', '2026-01-01T12:00:00Z', '2026-01-01T12:00:00Z')",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();

        let version = get_schema_version(&conn);
        assert_eq!(version, 2);

        // New columns exist with defaults
        let (assigned_name, ai_assigned): (Option<String>, i32) = conn
            .query_row(
                "SELECT assigned_name, ai_assigned FROM tasks WHERE id = 'task1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!(assigned_name.is_none());
        assert_eq!(ai_assigned, 0);
    }

    /// Test that migrations are idempotent
    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_v1_tasks_table(&conn);

        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let version = get_schema_version(&conn);
        assert_eq!(version, 2);
    }

    /// Test incremental migration (v1 -> v2)
    #[test]
    fn test_incremental_migration() {
        let conn = Connection::open_in_memory().unwrap();

        conn.execute(
            "CREATE TABLE schema_version (version INTEGER PRIMARY KEY)",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO schema_version (version) VALUES (1)", [])
            .unwrap();
        create_v1_tasks_table(&conn);

        migrate(&conn).unwrap();

        let version = get_schema_version(&conn);
        assert_eq!(version, 2);

        // New columns should exist
        let stmt = conn
            .prepare("SELECT assigned_name, ai_assigned FROM tasks")
            .unwrap();
        drop(stmt);
    }
}
