//! Course catalog persistence.

use super::{parse_json_column, timestamp, Store};
use crate::domain::Course;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use std::path::Path;

const COURSE_COLUMNS: &str = "code, name, description, skills_json, level, credit_hours, kulliyyah, \
                              available, capacity, prerequisites_json";

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    let skills_json: String = row.get(3)?;
    let prerequisites_json: String = row.get(9)?;
    Ok(Course {
        code: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        skills: parse_json_column(&skills_json, 3)?,
        level: row.get(4)?,
        credit_hours: row.get(5)?,
        kulliyyah: row.get(6)?,
        available: row.get(7)?,
        capacity: row.get(8)?,
        prerequisites: parse_json_column(&prerequisites_json, 9)?,
    })
}

impl Store {
    /// Insert or replace courses by code in one transaction.
    pub fn upsert_courses(&mut self, courses: &[Course]) -> Result<usize> {
        let now = timestamp(Utc::now());
        let tx = self.conn.transaction()?;
        for course in courses {
            if course.code.trim().is_empty() {
                bail!("Course with name '{}' has no course code", course.name);
            }
            tx.execute(
                "INSERT INTO courses(code, name, description, skills_json, level, credit_hours, kulliyyah,
                                     available, capacity, prerequisites_json, updated_at)
                 VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT(code) DO UPDATE SET
                     name = excluded.name,
                     description = excluded.description,
                     skills_json = excluded.skills_json,
                     level = excluded.level,
                     credit_hours = excluded.credit_hours,
                     kulliyyah = excluded.kulliyyah,
                     available = excluded.available,
                     capacity = excluded.capacity,
                     prerequisites_json = excluded.prerequisites_json,
                     updated_at = excluded.updated_at",
                params![
                    course.code.trim(),
                    course.name,
                    course.description,
                    serde_json::to_string(&course.skills)?,
                    course.level,
                    course.credit_hours,
                    course.kulliyyah,
                    course.available,
                    course.capacity,
                    serde_json::to_string(&course.prerequisites)?,
                    now,
                ],
            )?;
        }
        tx.commit()?;
        tracing::info!("Upserted {} courses", courses.len());
        Ok(courses.len())
    }

    /// Whole catalog ordered by course code.
    pub fn courses(&self) -> Result<Vec<Course>> {
        let mut stmt =
            self.conn.prepare(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY code"))?;
        let rows = stmt.query_map([], course_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn course(&self, code: &str) -> Result<Option<Course>> {
        let course = self
            .conn
            .query_row(
                &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE code = ?1"),
                params![code],
                course_from_row,
            )
            .optional()?;
        Ok(course)
    }

    pub fn set_availability(&self, code: &str, available: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE courses SET available = ?2, updated_at = ?3 WHERE code = ?1",
            params![code, available, timestamp(Utc::now())],
        )?;
        if changed == 0 {
            bail!("Unknown course code: {code}");
        }
        Ok(())
    }
}

/// Read a JSON or YAML array of course documents, chosen by file extension.
pub fn read_course_file(path: &Path) -> Result<Vec<Course>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read course file {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let courses: Vec<Course> = match ext.as_str() {
        "yml" | "yaml" => serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid YAML course file {}", path.display()))?,
        _ => serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON course file {}", path.display()))?,
    };
    Ok(courses)
}
