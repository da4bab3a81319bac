//! Database migration system.
//!
//! Tracks applied migrations in a `_migrations` table and applies
//! pending ones in order.

use rusqlite::Connection;

use super::error::DatabaseError;

/// A single migration definition.
struct Migration {
    version: u32,
    description: &'static str,
    sql: &'static str,
}

/// All migrations in order. Each is applied at most once.
const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create_content_items_table",
        sql: include_str!("sql/001_create_content_items.sql"),
    },
    Migration {
        version: 2,
        description: "index_content_items_status",
        sql: include_str!("sql/002_index_content_status.sql"),
    },
];

/// Runs all pending migrations on the given connection.
pub fn run_all(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |r| r.get(0),
    )?;

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        log::info!(
            "Running migration v{}: {}",
            migration.version,
            migration.description
        );

        conn.execute_batch(migration.sql)
            .map_err(|e| DatabaseError::Migration {
                version: migration.version,
                reason: e.to_string(),
            })?;

        conn.execute(
            "INSERT INTO _migrations (version, description) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.description],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        run_all(&conn).unwrap();
        conn
    }

    #[test]
    fn test_migrations_run_on_fresh_db() {
        let conn = fresh();
        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as u32);
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = fresh();
        run_all(&conn).unwrap();

        let count: u32 = conn
            .query_row("SELECT COUNT(*) FROM _migrations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, MIGRATIONS.len() as u32);
    }

    #[test]
    fn test_source_check_rejects_video_with_file_name() {
        let conn = fresh();
        let result = conn.execute(
            "INSERT INTO content_items (id, owner_id, title, content_type, source_file_name,
             processing_options, created_at, updated_at)
             VALUES ('v1', 'u', 't', 'video', 'clip.mp4', '{}', 'now', 'now')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_source_check_rejects_document_with_both_sources() {
        let conn = fresh();
        let result = conn.execute(
            "INSERT INTO content_items (id, owner_id, title, content_type, source_file_name,
             source_url, processing_options, created_at, updated_at)
             VALUES ('d1', 'u', 't', 'document', 'a.pdf', 'https://x', '{}', 'now', 'now')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_status_check_rejects_unknown_status() {
        let conn = fresh();
        let result = conn.execute(
            "INSERT INTO content_items (id, owner_id, title, content_type, source_file_name,
             status, processing_options, created_at, updated_at)
             VALUES ('d2', 'u', 't', 'document', 'a.pdf', 'archived', '{}', 'now', 'now')",
            [],
        );
        assert!(result.is_err());
    }
}
