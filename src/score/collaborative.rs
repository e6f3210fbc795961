//! Rating-based signal per course.

use super::ScoreMap;
use crate::domain::FeedbackRecord;
use std::collections::HashMap;

/// Keeps the normalised maximum just below one and avoids dividing by zero.
pub const NORMALIZATION_EPSILON: f64 = 1e-6;

/// Average rating per course, divided by the largest average plus epsilon.
///
/// One entry per input course code; courses without ratings score zero.
/// Feedback for codes outside `course_codes` is ignored.
pub fn collaborative_scores(course_codes: &[&str], feedback: &[FeedbackRecord]) -> ScoreMap {
    let mut sums: HashMap<&str, (f64, usize)> =
        course_codes.iter().map(|code| (*code, (0.0, 0))).collect();
    for record in feedback {
        if let Some((sum, count)) = sums.get_mut(record.course_code.as_str()) {
            *sum += f64::from(record.rating);
            *count += 1;
        }
    }

    let averages: ScoreMap = course_codes
        .iter()
        .map(|code| {
            let avg = match sums.get(code) {
                Some((sum, count)) if *count > 0 => sum / *count as f64,
                _ => 0.0,
            };
            ((*code).to_string(), avg)
        })
        .collect();

    let max = averages.values().copied().fold(0.0_f64, f64::max);
    averages.into_iter().map(|(code, avg)| (code, avg / (max + NORMALIZATION_EPSILON))).collect()
}
