//! Core domain types: catalog entries, student records and recommendation output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub mod config;

pub use config::{
    AlphaPolicy, AlphaTier, BoostConfig, Config, EvaluationConfig, FeedbackScope, ModelConfig,
    RankingConfig, ScoringConfig, StoreConfig, TfidfConfig,
};

/// A catalog course. Identity is the course code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "course_code", alias = "code")]
    pub code: String,
    #[serde(rename = "course_name", alias = "name", alias = "title")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "list_or_csv")]
    pub skills: Vec<String>,
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default)]
    pub credit_hours: Option<u32>,
    #[serde(default, alias = "department")]
    pub kulliyyah: Option<String>,
    #[serde(default = "default_available", alias = "is_available_this_semester")]
    pub available: bool,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default, deserialize_with = "list_or_csv")]
    pub prerequisites: Vec<String>,
}

fn default_level() -> i64 {
    1
}

fn default_available() -> bool {
    true
}

impl Course {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: String::new(),
            skills: Vec::new(),
            level: default_level(),
            credit_hours: None,
            kulliyyah: None,
            available: true,
            capacity: None,
            prerequisites: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_kulliyyah(mut self, kulliyyah: impl Into<String>) -> Self {
        self.kulliyyah = Some(kulliyyah.into());
        self
    }

    /// Raw text the content model is fitted on: name, description, then skills.
    pub fn document_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(2 + self.skills.len());
        if !self.name.trim().is_empty() {
            parts.push(&self.name);
        }
        if !self.description.trim().is_empty() {
            parts.push(&self.description);
        }
        parts.extend(self.skills.iter().map(String::as_str));
        parts.join(" ")
    }

    /// Case-insensitive grouping comparison.
    pub fn in_group(&self, group: &str) -> bool {
        let group = group.trim();
        !group.is_empty()
            && self.kulliyyah.as_deref().map(str::trim).is_some_and(|k| k.eq_ignore_ascii_case(group))
    }
}

/// Accept either a list of strings or a single comma-separated string.
fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        Csv(String),
        List(Vec<String>),
        Missing(Option<()>),
    }

    let items = match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::Csv(s) => s.split(',').map(str::to_string).collect(),
        ListOrCsv::List(items) => items,
        ListOrCsv::Missing(_) => Vec::new(),
    };
    Ok(items.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub kulliyyah: Option<String>,
    #[serde(default)]
    pub programme: Option<String>,
}

/// One rating of one course by one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub student_id: String,
    pub course_code: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

impl FeedbackRecord {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn new(student_id: impl Into<String>, course_code: impl Into<String>, rating: u8) -> Self {
        Self {
            student_id: student_id.into(),
            course_code: course_code.into(),
            rating,
            comment: String::new(),
        }
    }
}

/// A student's stated preferences. Only the most recent record per student is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    pub student_id: String,
    #[serde(default)]
    pub kulliyyah: Option<String>,
    #[serde(default, alias = "preferredTypes")]
    pub preferred_types: Vec<String>,
    #[serde(default, alias = "interests", alias = "goals")]
    pub topics: String,
    #[serde(default, alias = "coursesToAvoid")]
    pub courses_to_avoid: Vec<String>,
    #[serde(default, alias = "preferredTime")]
    pub preferred_time: Option<String>,
    #[serde(default)]
    pub semester: Option<u32>,
    #[serde(default)]
    pub cgpa: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl PreferenceRecord {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            kulliyyah: None,
            preferred_types: Vec::new(),
            topics: String::new(),
            courses_to_avoid: Vec::new(),
            preferred_time: None,
            semester: None,
            cgpa: None,
            created_at: Utc::now(),
        }
    }

    /// Free-text interest profile: topics followed by the preferred course types.
    pub fn profile_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.topics.trim().is_empty() {
            parts.push(self.topics.trim());
        }
        parts.extend(self.preferred_types.iter().map(|t| t.trim()).filter(|t| !t.is_empty()));
        parts.join(" ")
    }

    pub fn preferred_group(&self) -> Option<&str> {
        self.kulliyyah.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Enrolled,
    Dropped,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::Dropped => "dropped",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enrolled" => Some(EnrollmentStatus::Enrolled),
            "dropped" => Some(EnrollmentStatus::Dropped),
            _ => None,
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: String,
    pub course_code: String,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub student_id: String,
    pub course_code: String,
    #[serde(default)]
    pub semester_taken: Option<u32>,
    #[serde(default)]
    pub grade: Option<String>,
}

/// Course codes a student has already taken or is currently enrolled in.
pub type TakenCourseSet = BTreeSet<String>;

/// One ranked, explained recommendation. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub course_code: String,
    pub course_name: String,
    pub description: String,
    pub level: i64,
    pub credit_hours: Option<u32>,
    pub kulliyyah: Option<String>,
    pub skills: Vec<String>,
    /// Displayed match score in [0, 99].
    pub score: f64,
    /// Content similarity ×100.
    pub content_score: f64,
    /// Collaborative signal ×100.
    pub collaborative_score: f64,
    /// Weight given to content similarity.
    pub alpha: f64,
    pub boosted: bool,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_document_joins_name_description_and_skills() {
        let course = Course::new("CS101", "Intro Programming")
            .with_description("basics programming logic")
            .with_skills(["Python", "Logic"]);
        assert_eq!(course.document_text(), "Intro Programming basics programming logic Python Logic");
    }

    #[test]
    fn course_accepts_comma_separated_skills() {
        let course: Course = serde_json::from_str(
            r#"{"course_code":"CSCI4401","course_name":"Artificial Intelligence","skills":"AI, ML ,Python"}"#,
        )
        .expect("parse course");
        assert_eq!(course.skills, vec!["AI", "ML", "Python"]);
        assert!(course.available);
        assert_eq!(course.level, 1);
    }

    #[test]
    fn course_accepts_list_skills_and_legacy_availability_field() {
        let course: Course = serde_json::from_str(
            r#"{"course_code":"X1","course_name":"X","skills":["a","b"],"is_available_this_semester":false}"#,
        )
        .expect("parse course");
        assert_eq!(course.skills, vec!["a", "b"]);
        assert!(!course.available);
    }

    #[test]
    fn group_match_ignores_case_and_whitespace() {
        let course = Course::new("E1", "Circuits").with_kulliyyah(" KOE ");
        assert!(course.in_group("koe"));
        assert!(!course.in_group("KICT"));
        assert!(!course.in_group("  "));
    }

    #[test]
    fn preference_profile_text_combines_topics_and_types() {
        let mut pref = PreferenceRecord::new("s1");
        pref.topics = "machine learning".into();
        pref.preferred_types = vec!["Practical".into(), " ".into()];
        assert_eq!(pref.profile_text(), "machine learning Practical");
        assert_eq!(pref.preferred_group(), None);
    }

    #[test]
    fn preference_accepts_camel_case_aliases() {
        let pref: PreferenceRecord = serde_json::from_str(
            r#"{"student_id":"s1","kulliyyah":"KOE","preferredTypes":["Practical"],"coursesToAvoid":["CS101"],"created_at":"2024-01-01T00:00:00Z"}"#,
        )
        .expect("parse preference");
        assert_eq!(pref.preferred_types, vec!["Practical"]);
        assert_eq!(pref.courses_to_avoid, vec!["CS101"]);
        assert_eq!(pref.preferred_group(), Some("KOE"));
    }
}
