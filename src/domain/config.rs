//! Runtime configuration.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub model: ModelConfig,
    pub scoring: ScoringConfig,
    pub ranking: RankingConfig,
    pub evaluation: EvaluationConfig,
}

impl Config {
    /// Reject settings that would break the scorer's guarantees.
    pub fn validate(&self) -> Result<()> {
        self.model.tfidf.validate()?;
        self.scoring.alpha.validate()?;
        self.scoring.boost.validate()?;
        if self.ranking.top_n == 0 {
            bail!("ranking.top_n must be at least 1");
        }
        if !(1..=5).contains(&self.evaluation.relevance_threshold) {
            bail!("evaluation.relevance_threshold must be between 1 and 5");
        }
        if self.evaluation.k_values.iter().any(|k| *k == 0) {
            bail!("evaluation.k_values must all be positive");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub database: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { database: PathBuf::from(".course-recommender/store.sqlite") }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Rebuild the content model after every catalog import instead of
    /// waiting for an explicit `build-model`.
    pub rebuild_on_import: bool,
    pub tfidf: TfidfConfig,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".course-recommender/content-model.json"),
            rebuild_on_import: false,
            tfidf: TfidfConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfidfConfig {
    pub ngram_min: usize,
    pub ngram_max: usize,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df: f64,
    pub sublinear_tf: bool,
    pub stop_words: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            ngram_min: 1,
            ngram_max: 2,
            min_df: 1,
            max_df: 0.85,
            sublinear_tf: true,
            stop_words: true,
        }
    }
}

impl TfidfConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ngram_min == 0 || self.ngram_min > self.ngram_max {
            bail!(
                "model.tfidf ngram range ({}, {}) is invalid",
                self.ngram_min,
                self.ngram_max
            );
        }
        if self.min_df == 0 {
            bail!("model.tfidf.min_df must be at least 1");
        }
        if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            bail!("model.tfidf.max_df must be in (0, 1], got {}", self.max_df);
        }
        Ok(())
    }
}

/// Whose feedback feeds the collaborative score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackScope {
    /// Only the requesting student's own ratings.
    #[default]
    Student,
    /// Every student's ratings, averaged per course.
    Global,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub feedback_scope: FeedbackScope,
    pub alpha: AlphaPolicy,
    pub boost: BoostConfig,
    /// Profile used when a stored preference cannot be read.
    pub fallback_profile: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            feedback_scope: FeedbackScope::Student,
            alpha: AlphaPolicy::default(),
            boost: BoostConfig::default(),
            fallback_profile: "computer science programming".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaTier {
    /// Tier applies while the feedback count is strictly below this bound.
    pub below: usize,
    pub alpha: f64,
}

/// Weight on content similarity as a function of the student's feedback count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum AlphaPolicy {
    Stepped { tiers: Vec<AlphaTier>, min_alpha: f64, max_alpha: f64 },
    Linear { max_alpha: f64, min_alpha: f64, step: f64 },
}

impl Default for AlphaPolicy {
    fn default() -> Self {
        AlphaPolicy::Stepped {
            tiers: vec![
                AlphaTier { below: 1, alpha: 0.9 },
                AlphaTier { below: 5, alpha: 0.8 },
                AlphaTier { below: 20, alpha: 0.6 },
            ],
            min_alpha: 0.3,
            max_alpha: 0.9,
        }
    }
}

impl AlphaPolicy {
    pub fn linear_default() -> Self {
        AlphaPolicy::Linear { max_alpha: 0.8, min_alpha: 0.3, step: 0.05 }
    }

    pub fn bounds(&self) -> (f64, f64) {
        match self {
            AlphaPolicy::Stepped { min_alpha, max_alpha, .. }
            | AlphaPolicy::Linear { min_alpha, max_alpha, .. } => (*min_alpha, *max_alpha),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (min_alpha, max_alpha) = self.bounds();
        if !(0.0..=1.0).contains(&min_alpha) || !(0.0..=1.0).contains(&max_alpha) {
            bail!("scoring.alpha bounds must lie in [0, 1]");
        }
        if min_alpha > max_alpha {
            bail!("scoring.alpha.min_alpha ({min_alpha}) exceeds max_alpha ({max_alpha})");
        }
        match self {
            AlphaPolicy::Stepped { tiers, .. } => {
                let mut prev: Option<&AlphaTier> = None;
                for tier in tiers {
                    if !(min_alpha..=max_alpha).contains(&tier.alpha) {
                        bail!(
                            "scoring.alpha tier below {} has alpha {} outside [{min_alpha}, {max_alpha}]",
                            tier.below,
                            tier.alpha
                        );
                    }
                    if let Some(prev) = prev {
                        if tier.below <= prev.below || tier.alpha > prev.alpha {
                            bail!("scoring.alpha tiers must have increasing bounds and non-increasing alpha");
                        }
                    }
                    prev = Some(tier);
                }
            }
            AlphaPolicy::Linear { step, .. } => {
                if !step.is_finite() || *step < 0.0 {
                    bail!("scoring.alpha.step must be a finite, non-negative number, got {step}");
                }
            }
        }
        Ok(())
    }
}

/// Preferred-group boost applied on the 0–100 display scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    pub factor: f64,
    pub floor: f64,
    pub cap: f64,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self { factor: 1.5, floor: 10.0, cap: 99.0 }
    }
}

impl BoostConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.factor.is_finite() || self.factor < 1.0 {
            bail!("scoring.boost.factor must be a finite number of at least 1.0, got {}", self.factor);
        }
        if !(0.0..=100.0).contains(&self.cap) || !(0.0..=self.cap).contains(&self.floor) {
            bail!("scoring.boost requires 0 <= floor <= cap <= 100");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub top_n: usize,
    pub include_unavailable: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { top_n: 10, include_unavailable: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Ratings at or above this count as relevant.
    pub relevance_threshold: u8,
    pub k_values: Vec<usize>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { relevance_threshold: 4, k_values: vec![3, 5, 10] }
    }
}
