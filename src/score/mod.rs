//! Hybrid recommendation scoring.
//!
//! Scores are carried as maps keyed by course code rather than as parallel
//! arrays, so a course can never pick up another course's score.

use crate::domain::{
    Config, Course, FeedbackRecord, PreferenceRecord, RankingConfig, RecommendationResult,
    ScoringConfig, TakenCourseSet,
};
use crate::error::{RecommendError, RecommendResult};
use crate::model::{ContentModel, ModelRegistry};
use crate::rank::rank_courses;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

pub mod collaborative;
pub mod content;
pub mod hybrid;

pub use collaborative::collaborative_scores;
pub use content::content_scores;
pub use hybrid::{combine, display_score};

/// Course code to score.
pub type ScoreMap = BTreeMap<String, f64>;

/// Every intermediate score for one course.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseScore {
    pub course_code: String,
    /// Cosine similarity in [0, 1].
    pub content: f64,
    /// Normalised average rating in [0, 1].
    pub collaborative: f64,
    /// Weight given to `content`.
    pub alpha: f64,
    /// Convex combination in [0, 1].
    pub combined: f64,
    /// Boosted and capped score on the 0–99 scale.
    pub display: f64,
    pub boosted: bool,
}

/// Everything the scorer needs to know about one student.
#[derive(Debug)]
pub struct RecommendationRequest {
    pub student_id: String,
    /// Latest stored preference. `Err` means it exists but is unreadable.
    pub preference: RecommendResult<Option<PreferenceRecord>>,
    pub taken: TakenCourseSet,
    /// Feedback visible under the configured scope.
    pub feedback: Vec<FeedbackRecord>,
}

impl RecommendationRequest {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            preference: Ok(None),
            taken: TakenCourseSet::new(),
            feedback: Vec::new(),
        }
    }

    /// Number of ratings the student gave personally; drives the blend weight.
    pub fn own_feedback_count(&self) -> usize {
        self.feedback.iter().filter(|f| f.student_id == self.student_id).count()
    }

    fn valid_preference(&self) -> Option<&PreferenceRecord> {
        self.preference.as_ref().ok().and_then(Option::as_ref)
    }

    /// Interest profile text: the preference's topics and types, the student's
    /// own feedback comments when no preference was recorded, or the fallback
    /// profile when the stored preference is unreadable.
    pub fn profile_text(&self, fallback: &str) -> String {
        match &self.preference {
            Ok(Some(pref)) => pref.profile_text(),
            Ok(None) => self
                .feedback
                .iter()
                .filter(|f| f.student_id == self.student_id)
                .map(|f| f.comment.trim())
                .filter(|c| !c.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            Err(err) => {
                tracing::warn!(
                    "Using fallback profile for student {}: {}",
                    self.student_id,
                    err
                );
                fallback.to_string()
            }
        }
    }

    /// Taken courses plus the ones the student asked to avoid.
    pub fn exclusions(&self) -> BTreeSet<String> {
        let mut excluded = self.taken.clone();
        if let Some(pref) = self.valid_preference() {
            excluded.extend(pref.courses_to_avoid.iter().map(|c| c.trim().to_string()));
        }
        excluded
    }
}

pub struct Recommender {
    registry: Arc<ModelRegistry>,
    scoring: ScoringConfig,
    ranking: RankingConfig,
}

impl Recommender {
    pub fn new(registry: Arc<ModelRegistry>, config: &Config) -> Self {
        Self { registry, scoring: config.scoring.clone(), ranking: config.ranking.clone() }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Profile used when a student's own interests cannot be read.
    pub fn fallback_profile(&self) -> &str {
        &self.scoring.fallback_profile
    }

    /// Score every course against a profile. The blend weight is derived from
    /// the number of feedback records passed in.
    pub fn score_courses(
        &self,
        profile_text: &str,
        courses: &[Course],
        feedback: &[FeedbackRecord],
        preferred_group: Option<&str>,
    ) -> RecommendResult<Vec<CourseScore>> {
        if courses.is_empty() {
            tracing::debug!("{}; nothing to score", RecommendError::EmptyCatalog);
            return Ok(Vec::new());
        }
        let model = self.registry.require()?;
        self.score_table(&model, profile_text, courses, feedback, feedback.len(), preferred_group)
    }

    fn score_table(
        &self,
        model: &ContentModel,
        profile_text: &str,
        courses: &[Course],
        feedback: &[FeedbackRecord],
        feedback_count: usize,
        preferred_group: Option<&str>,
    ) -> RecommendResult<Vec<CourseScore>> {
        let courses = unique_by_code(courses);
        let codes: Vec<&str> = courses.iter().map(|c| c.code.as_str()).collect();
        let content = content_scores(model, profile_text, &codes);
        let collaborative = collaborative_scores(&codes, feedback);
        let alpha = self.scoring.alpha.alpha(feedback_count);
        let combined = combine(&codes, &content, &collaborative, alpha)?;
        tracing::debug!(
            "Scored {} courses (feedback={}, alpha={:.2})",
            codes.len(),
            feedback_count,
            alpha
        );

        let group = preferred_group.map(str::trim).filter(|g| !g.is_empty());
        let mut table = BTreeMap::new();
        for course in &courses {
            let code = course.code.as_str();
            let boosted = group.is_some_and(|g| course.in_group(g));
            let combined_score = combined[code];
            table.insert(
                code,
                CourseScore {
                    course_code: course.code.clone(),
                    content: content[code],
                    collaborative: collaborative[code],
                    alpha,
                    combined: combined_score,
                    display: display_score(combined_score, boosted, &self.scoring.boost),
                    boosted,
                },
            );
        }
        Ok(table.into_values().collect())
    }

    /// Rank and explain courses for a bare profile. Nothing is excluded;
    /// unavailable courses and `top_n` follow the ranking configuration.
    pub fn recommend_for_profile(
        &self,
        profile_text: &str,
        courses: &[Course],
        feedback: &[FeedbackRecord],
        preferred_group: Option<&str>,
    ) -> RecommendResult<Vec<RecommendationResult>> {
        if courses.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.registry.require()?;
        let scores =
            self.score_table(&model, profile_text, courses, feedback, feedback.len(), preferred_group)?;
        Ok(rank_courses(
            courses,
            &scores,
            &BTreeSet::new(),
            None,
            model.normalizer(),
            &self.ranking,
        ))
    }

    /// Full unfiltered score table for a request, in course-code order.
    pub fn score_request(
        &self,
        courses: &[Course],
        request: &RecommendationRequest,
    ) -> RecommendResult<Vec<CourseScore>> {
        if courses.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.registry.require()?;
        self.score_request_with(&model, courses, request)
    }

    fn score_request_with(
        &self,
        model: &ContentModel,
        courses: &[Course],
        request: &RecommendationRequest,
    ) -> RecommendResult<Vec<CourseScore>> {
        let profile = self.profile_for(request);
        let group = request.valid_preference().and_then(PreferenceRecord::preferred_group);
        self.score_table(
            model,
            &profile,
            courses,
            &request.feedback,
            request.own_feedback_count(),
            group,
        )
    }

    /// Score, filter, rank and explain recommendations for one student.
    pub fn recommend(
        &self,
        courses: &[Course],
        request: &RecommendationRequest,
    ) -> RecommendResult<Vec<RecommendationResult>> {
        if courses.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.registry.require()?;
        let scores = self.score_request_with(&model, courses, request)?;
        Ok(rank_courses(
            courses,
            &scores,
            &request.exclusions(),
            request.valid_preference(),
            model.normalizer(),
            &self.ranking,
        ))
    }

    fn profile_for(&self, request: &RecommendationRequest) -> String {
        request.profile_text(&self.scoring.fallback_profile)
    }
}

/// Last entry wins for a repeated course code, matching `ContentModel::build`.
fn unique_by_code(courses: &[Course]) -> Vec<&Course> {
    let mut by_code: BTreeMap<&str, &Course> = BTreeMap::new();
    for course in courses {
        if by_code.insert(course.code.as_str(), course).is_some() {
            tracing::warn!("Duplicate course code {} in catalog; keeping the last entry", course.code);
        }
    }
    by_code.into_values().collect()
}
