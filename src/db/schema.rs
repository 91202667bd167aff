use anyhow::{Context, Result};
use rusqlite::Connection;

struct Migration {
    version: &'static str,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: "001",
    name: "initial",
    sql: include_str!("migrations/001_initial.sql"),
}];

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .context("Failed to create schema_migrations table")?;

    let applied = get_applied_migrations(conn)?;

    for migration in MIGRATIONS {
        if !applied.contains(&migration.version.to_string()) {
            apply_migration(conn, migration)?;
        }
    }

    Ok(())
}

fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let versions = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(versions)
}

fn mark_migration_applied(conn: &Connection, version: &str, name: &str) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO schema_migrations (version, name, applied_at) VALUES (?, ?, ?)",
        (version, name, &now),
    )?;
    Ok(())
}

fn apply_migration(conn: &Connection, migration: &Migration) -> Result<()> {
    tracing::info!(
        "Applying migration {}: {}",
        migration.version,
        migration.name
    );

    // Run migration in a transaction
    conn.execute_batch(&format!("BEGIN TRANSACTION; {} COMMIT;", migration.sql))
        .with_context(|| {
            format!(
                "Failed to apply migration {}: {}",
                migration.version, migration.name
            )
        })?;

    mark_migration_applied(conn, migration.version, migration.name)?;

    tracing::info!("Migration {} applied successfully", migration.version);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_run_on_fresh_db() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='goals'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);

        let versions = get_applied_migrations(&conn).unwrap();
        assert_eq!(versions, vec!["001"]);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap(); // Should not fail

        let versions = get_applied_migrations(&conn).unwrap();
        assert_eq!(versions, vec!["001"]);
    }

    #[test]
    fn node_paths_are_unique_per_tree() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        // This test inserts orphan nodes to exercise the UNIQUE constraint in
        // isolation; it relies on SQLite's standard default of foreign_keys=OFF
        // (as the crate's runtime does). Restore that default here, since the
        // bundled SQLite build is compiled with SQLITE_DEFAULT_FOREIGN_KEYS=1.
        conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();

        conn.execute(
            "INSERT INTO skill_tree_nodes (id, skill_tree_id, node_path, title, level, focus_hours, created_at)
             VALUES ('n1', 't1', 'goal.clarify', 'Clarify', 1, 5.0, '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO skill_tree_nodes (id, skill_tree_id, node_path, title, level, focus_hours, created_at)
             VALUES ('n2', 't1', 'goal.clarify', 'Clarify again', 1, 5.0, '2026-01-01T00:00:00Z')",
            [],
        );
        assert!(duplicate.is_err());

        // Same path in a different tree is fine.
        conn.execute(
            "INSERT INTO skill_tree_nodes (id, skill_tree_id, node_path, title, level, focus_hours, created_at)
             VALUES ('n3', 't2', 'goal.clarify', 'Clarify', 1, 5.0, '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
    }
}
