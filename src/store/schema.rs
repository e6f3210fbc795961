//! SQLite schema for the course store.

use anyhow::{bail, Result};
use rusqlite::Connection;
use std::path::Path;

pub const SCHEMA_VERSION: i64 = 1;

pub fn open_or_create(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    apply_schema(&conn)?;
    Ok(conn)
}

/// Create missing tables and verify the recorded schema version.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS courses (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            skills_json TEXT NOT NULL DEFAULT '[]',
            level INTEGER NOT NULL DEFAULT 1,
            credit_hours INTEGER,
            kulliyyah TEXT,
            available INTEGER NOT NULL DEFAULT 1,
            capacity INTEGER,
            prerequisites_json TEXT NOT NULL DEFAULT '[]',
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS students (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            kulliyyah TEXT,
            programme TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS preferences (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL REFERENCES students(id),
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_preferences_student
            ON preferences(student_id, created_at);

        CREATE TABLE IF NOT EXISTS feedback (
            student_id TEXT NOT NULL REFERENCES students(id),
            course_code TEXT NOT NULL,
            rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
            comment TEXT NOT NULL DEFAULT '',
            submitted_at TEXT NOT NULL,
            PRIMARY KEY (student_id, course_code)
        );

        CREATE TABLE IF NOT EXISTS enrollments (
            student_id TEXT NOT NULL REFERENCES students(id),
            course_code TEXT NOT NULL,
            status TEXT NOT NULL,
            enrolled_at TEXT NOT NULL,
            PRIMARY KEY (student_id, course_code)
        );

        CREATE TABLE IF NOT EXISTS transcript (
            student_id TEXT NOT NULL REFERENCES students(id),
            course_code TEXT NOT NULL,
            semester_taken INTEGER,
            grade TEXT,
            PRIMARY KEY (student_id, course_code)
        );
        ",
    )?;

    let current: Option<i64> =
        conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0)).ok();
    match current {
        None => {
            conn.execute("INSERT INTO schema_version(version) VALUES(?1)", [SCHEMA_VERSION])?;
        }
        Some(version) if version == SCHEMA_VERSION => {}
        Some(version) => {
            bail!("Unsupported store schema version {version}; expected {}", SCHEMA_VERSION);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_inserts_schema_version_once() {
        let tmp = TempDir::new().expect("temp dir");
        let db = tmp.path().join("store.sqlite");
        drop(open_or_create(&db).expect("create"));
        let conn = open_or_create(&db).expect("reopen");
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .expect("count");
        assert_eq!(rows, 1);
    }

    #[test]
    fn rejects_mismatched_schema_version() {
        let tmp = TempDir::new().expect("temp dir");
        let db = tmp.path().join("store.sqlite");
        let conn = Connection::open(&db).expect("open db");
        conn.execute_batch(
            "CREATE TABLE schema_version(version INTEGER NOT NULL);\
             INSERT INTO schema_version(version) VALUES(999);",
        )
        .expect("seed schema version");

        drop(conn);

        let err = open_or_create(&db).expect_err("must fail on mismatched schema version");
        assert!(err.to_string().contains("Unsupported store schema version"));
    }
}
