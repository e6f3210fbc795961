//! Students and their activity: preferences, feedback, enrollments, transcript.

use super::{bad_column, parse_timestamp, timestamp, Store};
use crate::domain::{
    Enrollment, EnrollmentStatus, FeedbackRecord, FeedbackScope, PreferenceRecord, Student,
    TakenCourseSet, TranscriptEntry,
};
use crate::error::{RecommendError, RecommendResult};
use anyhow::{bail, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        kulliyyah: row.get(3)?,
        programme: row.get(4)?,
    })
}

fn feedback_from_row(row: &Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    Ok(FeedbackRecord {
        student_id: row.get(0)?,
        course_code: row.get(1)?,
        rating: row.get(2)?,
        comment: row.get(3)?,
    })
}

impl Store {
    pub fn add_student(&self, student: &Student) -> Result<()> {
        if student.id.trim().is_empty() {
            bail!("Student id must not be empty");
        }
        if self.student(&student.id)?.is_some() {
            bail!("Student {} is already registered", student.id);
        }
        self.conn.execute(
            "INSERT INTO students(id, name, email, kulliyyah, programme, created_at)
             VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                student.id,
                student.name,
                student.email,
                student.kulliyyah,
                student.programme,
                timestamp(Utc::now())
            ],
        )?;
        Ok(())
    }

    pub fn student(&self, id: &str) -> Result<Option<Student>> {
        let student = self
            .conn
            .query_row(
                "SELECT id, name, email, kulliyyah, programme FROM students WHERE id = ?1",
                params![id],
                student_from_row,
            )
            .optional()?;
        Ok(student)
    }

    pub fn students(&self) -> Result<Vec<Student>> {
        let mut stmt =
            self.conn.prepare("SELECT id, name, email, kulliyyah, programme FROM students ORDER BY id")?;
        let rows = stmt.query_map([], student_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn require_student(&self, id: &str) -> Result<()> {
        if self.student(id)?.is_none() {
            bail!("Unknown student id: {id}");
        }
        Ok(())
    }

    fn require_course(&self, code: &str) -> Result<()> {
        if self.course(code)?.is_none() {
            bail!("Unknown course code: {code}");
        }
        Ok(())
    }

    /// Append a preference record; earlier ones are kept as history.
    pub fn save_preference(&self, preference: &PreferenceRecord) -> Result<()> {
        self.require_student(&preference.student_id)?;
        self.conn.execute(
            "INSERT INTO preferences(student_id, payload, created_at) VALUES(?1, ?2, ?3)",
            params![
                preference.student_id,
                serde_json::to_string(preference)?,
                timestamp(preference.created_at)
            ],
        )?;
        Ok(())
    }

    /// The most recent preference for a student.
    ///
    /// The outer result is a database failure; the inner one reports a stored
    /// document that no longer parses, which callers may choose to tolerate.
    pub fn latest_preference(
        &self,
        student_id: &str,
    ) -> Result<RecommendResult<Option<PreferenceRecord>>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM preferences WHERE student_id = ?1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                params![student_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(payload) = payload else {
            return Ok(Ok(None));
        };
        Ok(serde_json::from_str::<PreferenceRecord>(&payload)
            .map(Some)
            .map_err(|err| RecommendError::InvalidPreferenceData(err.to_string())))
    }

    /// Record a rating, replacing any earlier rating of the same course by the same student.
    pub fn submit_feedback(&self, feedback: &FeedbackRecord) -> Result<()> {
        let range = FeedbackRecord::MIN_RATING..=FeedbackRecord::MAX_RATING;
        if !range.contains(&feedback.rating) {
            bail!(
                "Rating {} is out of range; expected {}-{}",
                feedback.rating,
                FeedbackRecord::MIN_RATING,
                FeedbackRecord::MAX_RATING
            );
        }
        self.require_student(&feedback.student_id)?;
        self.require_course(&feedback.course_code)?;
        self.conn.execute(
            "INSERT INTO feedback(student_id, course_code, rating, comment, submitted_at)
             VALUES(?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(student_id, course_code) DO UPDATE SET
                 rating = excluded.rating,
                 comment = excluded.comment,
                 submitted_at = excluded.submitted_at",
            params![
                feedback.student_id,
                feedback.course_code,
                feedback.rating,
                feedback.comment,
                timestamp(Utc::now())
            ],
        )?;
        Ok(())
    }

    pub fn feedback_for_student(&self, student_id: &str) -> Result<Vec<FeedbackRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, course_code, rating, comment FROM feedback
             WHERE student_id = ?1 ORDER BY course_code",
        )?;
        let rows = stmt.query_map(params![student_id], feedback_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn all_feedback(&self) -> Result<Vec<FeedbackRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, course_code, rating, comment FROM feedback
             ORDER BY student_id, course_code",
        )?;
        let rows = stmt.query_map([], feedback_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Feedback the collaborative signal should see for this student.
    pub fn feedback_in_scope(&self, student_id: &str, scope: FeedbackScope) -> Result<Vec<FeedbackRecord>> {
        match scope {
            FeedbackScope::Student => self.feedback_for_student(student_id),
            FeedbackScope::Global => self.all_feedback(),
        }
    }

    /// Enroll a student, re-activating a dropped enrollment if one exists.
    pub fn enroll(&self, student_id: &str, course_code: &str) -> Result<Enrollment> {
        self.require_student(student_id)?;
        let Some(course) = self.course(course_code)? else {
            bail!("Unknown course code: {course_code}");
        };

        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT status FROM enrollments WHERE student_id = ?1 AND course_code = ?2",
                params![student_id, course_code],
                |row| row.get(0),
            )
            .optional()?;
        if existing.as_deref() == Some(EnrollmentStatus::Enrolled.as_str()) {
            bail!("Student {student_id} is already enrolled in {course_code}");
        }

        if let Some(capacity) = course.capacity {
            let enrolled: u32 = self.conn.query_row(
                "SELECT COUNT(*) FROM enrollments WHERE course_code = ?1 AND status = ?2",
                params![course_code, EnrollmentStatus::Enrolled.as_str()],
                |row| row.get(0),
            )?;
            if enrolled >= capacity {
                bail!("Course {course_code} is full ({enrolled}/{capacity})");
            }
        }

        let enrolled_at = Utc::now();
        self.conn.execute(
            "INSERT INTO enrollments(student_id, course_code, status, enrolled_at) VALUES(?1, ?2, ?3, ?4)
             ON CONFLICT(student_id, course_code) DO UPDATE SET
                 status = excluded.status,
                 enrolled_at = excluded.enrolled_at",
            params![student_id, course_code, EnrollmentStatus::Enrolled.as_str(), timestamp(enrolled_at)],
        )?;
        tracing::debug!("Enrolled {} in {}", student_id, course_code);
        Ok(Enrollment {
            student_id: student_id.to_string(),
            course_code: course_code.to_string(),
            status: EnrollmentStatus::Enrolled,
            enrolled_at,
        })
    }

    pub fn drop_enrollment(&self, student_id: &str, course_code: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE enrollments SET status = ?3 WHERE student_id = ?1 AND course_code = ?2 AND status = ?4",
            params![
                student_id,
                course_code,
                EnrollmentStatus::Dropped.as_str(),
                EnrollmentStatus::Enrolled.as_str()
            ],
        )?;
        if changed == 0 {
            bail!("Student {student_id} is not enrolled in {course_code}");
        }
        Ok(())
    }

    pub fn enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, course_code, status, enrolled_at FROM enrollments
             WHERE student_id = ?1 ORDER BY course_code",
        )?;
        let rows = stmt.query_map(params![student_id], |row| {
            let status: String = row.get(2)?;
            let enrolled_at: String = row.get(3)?;
            Ok(Enrollment {
                student_id: row.get(0)?,
                course_code: row.get(1)?,
                status: EnrollmentStatus::parse(&status)
                    .ok_or_else(|| bad_column(2, format!("unknown enrollment status '{status}'")))?,
                enrolled_at: parse_timestamp(&enrolled_at, 3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn add_transcript_entry(&self, entry: &TranscriptEntry) -> Result<()> {
        self.require_student(&entry.student_id)?;
        self.conn.execute(
            "INSERT INTO transcript(student_id, course_code, semester_taken, grade) VALUES(?1, ?2, ?3, ?4)
             ON CONFLICT(student_id, course_code) DO UPDATE SET
                 semester_taken = excluded.semester_taken,
                 grade = excluded.grade",
            params![entry.student_id, entry.course_code, entry.semester_taken, entry.grade],
        )?;
        Ok(())
    }

    pub fn transcript(&self, student_id: &str) -> Result<Vec<TranscriptEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT student_id, course_code, semester_taken, grade FROM transcript
             WHERE student_id = ?1 ORDER BY course_code",
        )?;
        let rows = stmt.query_map(params![student_id], |row| {
            Ok(TranscriptEntry {
                student_id: row.get(0)?,
                course_code: row.get(1)?,
                semester_taken: row.get(2)?,
                grade: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Transcript courses plus active enrollments.
    pub fn taken_courses(&self, student_id: &str) -> Result<TakenCourseSet> {
        let mut stmt = self.conn.prepare(
            "SELECT course_code FROM transcript WHERE student_id = ?1
             UNION
             SELECT course_code FROM enrollments WHERE student_id = ?1 AND status = ?2",
        )?;
        let rows = stmt.query_map(params![student_id, EnrollmentStatus::Enrolled.as_str()], |row| {
            row.get::<_, String>(0)
        })?;
        Ok(rows.collect::<rusqlite::Result<TakenCourseSet>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Course;

    fn student(id: &str) -> Student {
        Student { id: id.into(), name: format!("Student {id}"), email: None, kulliyyah: None, programme: None }
    }

    fn seeded() -> Store {
        let mut store = Store::open_in_memory().expect("store");
        let mut small = Course::new("CS300", "Seminar");
        small.capacity = Some(1);
        store
            .upsert_courses(&[Course::new("CS101", "Intro"), Course::new("CS201", "Data Structures"), small])
            .expect("courses");
        store.add_student(&student("s1")).expect("s1");
        store.add_student(&student("s2")).expect("s2");
        store
    }

    #[test]
    fn duplicate_student_is_rejected() {
        let store = seeded();
        assert!(store.add_student(&student("s1")).is_err());
        assert_eq!(store.students().expect("students").len(), 2);
    }

    #[test]
    fn latest_preference_wins() {
        let store = seeded();
        assert!(matches!(store.latest_preference("s1").expect("query"), Ok(None)));

        let mut old = PreferenceRecord::new("s1");
        old.topics = "history".into();
        old.created_at = Utc::now() - chrono::Duration::days(1);
        let mut new = PreferenceRecord::new("s1");
        new.topics = "robotics".into();
        store.save_preference(&new).expect("save new");
        store.save_preference(&old).expect("save old");

        let latest = store.latest_preference("s1").expect("query").expect("valid").expect("present");
        assert_eq!(latest.topics, "robotics");
    }

    #[test]
    fn unparsable_preference_is_reported_not_fatal() {
        let store = seeded();
        store
            .conn
            .execute(
                "INSERT INTO preferences(student_id, payload, created_at) VALUES('s1', '{broken', ?1)",
                params![timestamp(Utc::now())],
            )
            .expect("insert raw");
        let result = store.latest_preference("s1").expect("db ok");
        assert!(matches!(result, Err(RecommendError::InvalidPreferenceData(_))));
    }

    #[test]
    fn feedback_upserts_and_validates() {
        let store = seeded();
        store.submit_feedback(&FeedbackRecord::new("s1", "CS101", 2)).expect("first");
        let mut again = FeedbackRecord::new("s1", "CS101", 5);
        again.comment = "much better second time".into();
        store.submit_feedback(&again).expect("replace");

        let rows = store.feedback_for_student("s1").expect("feedback");
        assert_eq!(rows, vec![again]);

        assert!(store.submit_feedback(&FeedbackRecord::new("s1", "CS101", 0)).is_err());
        assert!(store.submit_feedback(&FeedbackRecord::new("s1", "CS101", 6)).is_err());
        assert!(store.submit_feedback(&FeedbackRecord::new("ghost", "CS101", 3)).is_err());
        assert!(store.submit_feedback(&FeedbackRecord::new("s1", "NOPE", 3)).is_err());
    }

    #[test]
    fn feedback_scope_selects_rows() {
        let store = seeded();
        store.submit_feedback(&FeedbackRecord::new("s1", "CS101", 4)).expect("s1");
        store.submit_feedback(&FeedbackRecord::new("s2", "CS201", 5)).expect("s2");
        assert_eq!(store.feedback_in_scope("s1", FeedbackScope::Student).expect("own").len(), 1);
        assert_eq!(store.feedback_in_scope("s1", FeedbackScope::Global).expect("all").len(), 2);
    }

    #[test]
    fn enrollment_respects_capacity_and_duplicates() {
        let store = seeded();
        store.enroll("s1", "CS300").expect("first seat");
        let full = store.enroll("s2", "CS300").expect_err("course full");
        assert!(full.to_string().contains("full"));
        assert!(store.enroll("s1", "CS300").is_err());

        store.drop_enrollment("s1", "CS300").expect("drop");
        assert!(store.drop_enrollment("s1", "CS300").is_err());
        store.enroll("s2", "CS300").expect("seat freed");
        store.enroll("s1", "CS101").expect("no capacity limit");

        let statuses: Vec<EnrollmentStatus> =
            store.enrollments("s1").expect("rows").into_iter().map(|e| e.status).collect();
        assert_eq!(statuses, vec![EnrollmentStatus::Enrolled, EnrollmentStatus::Dropped]);
    }

    #[test]
    fn taken_courses_union_transcript_and_active_enrollments() {
        let store = seeded();
        store
            .add_transcript_entry(&TranscriptEntry {
                student_id: "s1".into(),
                course_code: "CS101".into(),
                semester_taken: Some(1),
                grade: Some("A".into()),
            })
            .expect("transcript");
        store.enroll("s1", "CS201").expect("enroll");
        store.enroll("s1", "CS300").expect("enroll");
        store.drop_enrollment("s1", "CS300").expect("drop");

        let taken: Vec<String> = store.taken_courses("s1").expect("taken").into_iter().collect();
        assert_eq!(taken, vec!["CS101", "CS201"]);
        assert!(store.taken_courses("s2").expect("taken").is_empty());
        assert_eq!(store.transcript("s1").expect("rows")[0].grade.as_deref(), Some("A"));
    }

    #[test]
    fn corrupt_enrollment_rows_are_reported() {
        let store = seeded();
        store.enroll("s1", "CS101").expect("enroll");
        store
            .conn
            .execute("UPDATE enrollments SET status = 'paused' WHERE student_id = 's1'", [])
            .expect("corrupt status");
        let err = store.enrollments("s1").expect_err("unknown status");
        assert!(format!("{err:#}").contains("paused"));

        store
            .conn
            .execute(
                "UPDATE enrollments SET status = 'enrolled', enrolled_at = 'soon' WHERE student_id = 's1'",
                [],
            )
            .expect("corrupt timestamp");
        assert!(store.enrollments("s1").is_err());
    }
}
