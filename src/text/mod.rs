//! Text normalisation shared by model building and query projection.
//!
//! Catalog documents and interest profiles must go through the same
//! [`Normalizer`] settings; the content model stores the settings it was
//! fitted with so queries are projected identically.

use crate::domain::TfidfConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub mod stopwords;

pub use stopwords::is_stop_word;

/// Tokens are runs of two or more word characters.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalizer {
    pub ngram_min: usize,
    pub ngram_max: usize,
    pub stop_words: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&TfidfConfig::default())
    }
}

impl Normalizer {
    pub fn from_config(cfg: &TfidfConfig) -> Self {
        Self { ngram_min: cfg.ngram_min.max(1), ngram_max: cfg.ngram_max.max(1), stop_words: cfg.stop_words }
    }

    /// Lowercased word tokens with stop words removed.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN_PATTERN
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words || !is_stop_word(t))
            .map(str::to_string)
            .collect()
    }

    /// N-gram terms in document order, n within the configured range.
    /// N-grams are formed after stop-word removal.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let tokens = self.tokens(text);
        let mut terms = Vec::new();
        for n in self.ngram_min..=self.ngram_max {
            if n > tokens.len() {
                break;
            }
            if n == 1 {
                terms.extend(tokens.iter().cloned());
                continue;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    pub fn token_set(&self, text: &str) -> BTreeSet<String> {
        self.tokens(text).into_iter().collect()
    }
}
