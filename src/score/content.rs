//! Content similarity between an interest profile and every course.

use super::ScoreMap;
use crate::model::ContentModel;
use rayon::prelude::*;

/// Cosine similarity of `profile` against each course in `course_codes`.
///
/// Returns exactly one entry per course code. Courses the model has no vector
/// for (added after the last build) score zero until the next rebuild.
pub fn content_scores(model: &ContentModel, profile: &str, course_codes: &[&str]) -> ScoreMap {
    let query = model.project(profile);
    if query.is_empty() {
        tracing::debug!("Profile has no in-vocabulary terms; content scores are all zero");
    }

    let missing = course_codes.iter().filter(|code| !model.contains(code)).count();
    if missing > 0 {
        tracing::warn!(
            "{missing} course(s) are not in the content model; rebuild it to score them on content"
        );
    }

    course_codes
        .par_iter()
        .map(|code| {
            let score = match (query.is_empty(), model.row(code)) {
                (false, Some(row)) => query.dot(row).clamp(0.0, 1.0),
                _ => 0.0,
            };
            ((*code).to_string(), score)
        })
        .collect()
}
