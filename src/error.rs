//! Errors raised by the scoring core.
//!
//! Store, config and CLI code use `anyhow`; the core keeps a typed error so
//! callers can tell "try again later" apart from programming mistakes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Scoring was attempted before any content model was loaded.
    #[error("Content model not loaded; run `course-recommender build-model` and retry")]
    ModelNotReady,

    /// There are no courses to score.
    #[error("Course catalog is empty")]
    EmptyCatalog,

    /// Score maps disagree with the course list they were computed for.
    #[error(
        "Score alignment violated: {expected} courses, {content} content scores, {collaborative} collaborative scores"
    )]
    AlignmentViolation { expected: usize, content: usize, collaborative: usize },

    /// A stored preference document could not be interpreted.
    #[error("Invalid preference data: {0}")]
    InvalidPreferenceData(String),

    /// Model build was attempted on an empty catalog.
    #[error("No course data to build a content model from")]
    NoData,

    /// Every term was pruned by the document-frequency thresholds.
    #[error("After pruning, no terms remain; lower min_df or raise max_df")]
    EmptyVocabulary,

    /// The persisted model artifact is unreadable or incompatible.
    #[error("Invalid model artifact: {0}")]
    ModelFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RecommendError {
    /// Whether the caller may reasonably retry the whole request later,
    /// e.g. after an administrator rebuilds or reloads the model.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RecommendError::ModelNotReady)
    }
}

pub type RecommendResult<T> = std::result::Result<T, RecommendError>;
