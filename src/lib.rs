//! course-recommender: hybrid course recommendations for students
//!
//! Blends TF-IDF content similarity between a student's interests and the
//! course catalog with a collaborative signal from course ratings, then
//! filters, ranks and explains the results.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod eval;
pub mod model;
pub mod rank;
pub mod render;
pub mod score;
pub mod store;
pub mod text;
pub mod utils;

pub use domain::{Config, Course, FeedbackRecord, PreferenceRecord, RecommendationResult};
pub use error::{RecommendError, RecommendResult};
pub use model::{ContentModel, ModelRegistry};
pub use score::{RecommendationRequest, Recommender};
