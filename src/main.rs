//! course-recommender: hybrid content + collaborative course recommendations
//!
//! Manages a course catalog and student activity in a local SQLite store,
//! builds the TF-IDF content model and prints ranked, explained
//! recommendations.

use anyhow::Result;

fn main() -> Result<()> {
    course_recommender::cli::run()
}
