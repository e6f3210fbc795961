//! Final filtering, ordering and explanation of scored courses.

use crate::domain::{Course, PreferenceRecord, RankingConfig, RecommendationResult};
use crate::score::CourseScore;
use crate::text::Normalizer;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

pub const FALLBACK_REASON: &str = "AI-recommended from your interests";

/// Highest displayed score first; ties broken by ascending course code.
pub fn compare_scores(a: &CourseScore, b: &CourseScore) -> Ordering {
    b.display
        .partial_cmp(&a.display)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.course_code.cmp(&b.course_code))
}

/// Every scored course code in rank order, without any filtering.
pub fn ranked_codes(scores: &[CourseScore]) -> Vec<String> {
    let mut sorted: Vec<&CourseScore> = scores.iter().collect();
    sorted.sort_by(|a, b| compare_scores(a, b));
    sorted.into_iter().map(|s| s.course_code.clone()).collect()
}

/// Drop excluded (taken or avoided) and, unless configured otherwise,
/// unavailable courses; order the rest and keep the top `cfg.top_n`.
pub fn rank_courses(
    courses: &[Course],
    scores: &[CourseScore],
    exclude: &BTreeSet<String>,
    preference: Option<&PreferenceRecord>,
    normalizer: &Normalizer,
    cfg: &RankingConfig,
) -> Vec<RecommendationResult> {
    let by_code: HashMap<&str, &Course> = courses.iter().map(|c| (c.code.as_str(), c)).collect();

    let mut eligible: Vec<(&CourseScore, &Course)> = scores
        .iter()
        .filter(|score| !exclude.contains(&score.course_code))
        .filter_map(|score| by_code.get(score.course_code.as_str()).map(|course| (score, *course)))
        .filter(|(_, course)| cfg.include_unavailable || course.available)
        .collect();
    eligible.sort_by(|a, b| compare_scores(a.0, b.0));
    eligible.truncate(cfg.top_n);

    eligible
        .into_iter()
        .map(|(score, course)| RecommendationResult {
            course_code: course.code.clone(),
            course_name: course.name.clone(),
            description: course.description.clone(),
            level: course.level,
            credit_hours: course.credit_hours,
            kulliyyah: course.kulliyyah.clone(),
            skills: course.skills.clone(),
            score: round_to(score.display, 1),
            content_score: round_to(score.content * 100.0, 1),
            collaborative_score: round_to(score.collaborative * 100.0, 1),
            alpha: round_to(score.alpha, 2),
            boosted: score.boosted,
            explanation: explain(course, score, preference, normalizer),
        })
        .collect()
}

/// Human-readable justification, always ending with the match percentage.
pub fn explain(
    course: &Course,
    score: &CourseScore,
    preference: Option<&PreferenceRecord>,
    normalizer: &Normalizer,
) -> String {
    let mut parts: Vec<String> = Vec::new();

    if score.boosted {
        let group = course.kulliyyah.as_deref().map(str::trim).unwrap_or_default();
        parts.push(format!("Matches your preferred kulliyyah ({group})"));
    }

    if let Some(kind) = preference.and_then(|p| matched_type(course, p, normalizer)) {
        parts.push(format!("Fits your preference for {kind} courses"));
    }

    if parts.is_empty() {
        parts.push(FALLBACK_REASON.to_string());
    }
    parts.push(format!("{}% match", score.display.round() as u32));
    parts.join(" • ")
}

/// First preferred course type whose words all appear in the course text.
fn matched_type<'a>(
    course: &Course,
    preference: &'a PreferenceRecord,
    normalizer: &Normalizer,
) -> Option<&'a str> {
    let course_tokens = normalizer.token_set(&course.document_text());
    preference.preferred_types.iter().map(|t| t.trim()).find(|kind| {
        let wanted = normalizer.token_set(kind);
        !wanted.is_empty() && wanted.is_subset(&course_tokens)
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(code: &str, display: f64, boosted: bool) -> CourseScore {
        CourseScore {
            course_code: code.to_string(),
            content: display / 100.0,
            collaborative: 0.0,
            alpha: 0.9,
            combined: display / 100.0,
            display,
            boosted,
        }
    }

    fn courses() -> Vec<Course> {
        vec![
            Course::new("A1", "Robotics Lab").with_description("practical hardware project").with_kulliyyah("KOE"),
            Course::new("B1", "Compilers").with_description("parsing theory"),
            Course::new("C1", "Databases").with_description("sql design"),
            Course::new("D1", "Networks").with_description("protocols"),
        ]
    }

    fn cfg(top_n: usize) -> RankingConfig {
        RankingConfig { top_n, include_unavailable: false }
    }

    #[test]
    fn taken_courses_never_appear() {
        let scores = vec![score("A1", 90.0, false), score("B1", 50.0, false), score("C1", 10.0, false)];
        let exclude: BTreeSet<String> = ["A1".to_string()].into();
        let results = rank_courses(&courses(), &scores, &exclude, None, &Normalizer::default(), &cfg(10));
        let codes: Vec<&str> = results.iter().map(|r| r.course_code.as_str()).collect();
        assert_eq!(codes, vec!["B1", "C1"]);
    }

    #[test]
    fn ties_break_by_course_code_and_truncate() {
        let scores = vec![score("C1", 40.0, false), score("A1", 40.0, false), score("B1", 40.0, false)];
        let results =
            rank_courses(&courses(), &scores, &BTreeSet::new(), None, &Normalizer::default(), &cfg(2));
        let codes: Vec<&str> = results.iter().map(|r| r.course_code.as_str()).collect();
        assert_eq!(codes, vec!["A1", "B1"]);
    }

    #[test]
    fn unavailable_courses_are_filtered_unless_configured() {
        let mut catalog = courses();
        catalog[3].available = false;
        let scores = vec![score("D1", 80.0, false), score("C1", 20.0, false)];

        let results = rank_courses(&catalog, &scores, &BTreeSet::new(), None, &Normalizer::default(), &cfg(10));
        assert_eq!(results.len(), 1);

        let open = RankingConfig { top_n: 10, include_unavailable: true };
        let results = rank_courses(&catalog, &scores, &BTreeSet::new(), None, &Normalizer::default(), &open);
        assert_eq!(results[0].course_code, "D1");
    }

    #[test]
    fn nothing_left_is_empty_not_error() {
        let scores = vec![score("A1", 90.0, false)];
        let exclude: BTreeSet<String> = ["A1".to_string()].into();
        assert!(rank_courses(&courses(), &scores, &exclude, None, &Normalizer::default(), &cfg(10)).is_empty());
        assert!(rank_courses(&[], &[], &BTreeSet::new(), None, &Normalizer::default(), &cfg(10)).is_empty());
    }

    #[test]
    fn explanation_mentions_group_type_and_percentage() {
        let mut pref = PreferenceRecord::new("s1");
        pref.kulliyyah = Some("KOE".into());
        pref.preferred_types = vec!["Theory".into(), "Practical".into()];
        let catalog = courses();

        let text = explain(&catalog[0], &score("A1", 60.0, true), Some(&pref), &Normalizer::default());
        assert_eq!(
            text,
            "Matches your preferred kulliyyah (KOE) • Fits your preference for Practical courses • 60% match"
        );
    }

    #[test]
    fn explanation_falls_back_to_generic_reason() {
        let catalog = courses();
        let text = explain(&catalog[2], &score("C1", 33.4, false), None, &Normalizer::default());
        assert_eq!(text, "AI-recommended from your interests • 33% match");
    }

    #[test]
    fn result_scales_sub_scores_to_percent() {
        let mut s = score("B1", 45.0, false);
        s.content = 0.4567;
        s.collaborative = 0.5;
        s.alpha = 0.8;
        let results = rank_courses(&courses(), &[s], &BTreeSet::new(), None, &Normalizer::default(), &cfg(10));
        assert_eq!(results[0].content_score, 45.7);
        assert_eq!(results[0].collaborative_score, 50.0);
        assert_eq!(results[0].alpha, 0.8);
        assert_eq!(results[0].course_name, "Compilers");
    }

    #[test]
    fn ranked_codes_orders_everything() {
        let scores = vec![score("B1", 10.0, false), score("A1", 30.0, false), score("C1", 10.0, false)];
        assert_eq!(ranked_codes(&scores), vec!["A1", "B1", "C1"]);
    }
}
