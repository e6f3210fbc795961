//! TF-IDF content model over the course catalog.
//!
//! One L2-normalised vector per course, keyed by course code. Vocabulary
//! indices follow lexicographic term order so identical catalogs always
//! produce identical models. The model is rebuilt wholesale; there is no
//! incremental update.

use crate::domain::{Course, TfidfConfig};
use crate::error::{RecommendError, RecommendResult};
use crate::text::Normalizer;
use crate::utils::catalog_fingerprint;
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub mod persist;
pub mod registry;

pub use persist::{load_model, save_model, MODEL_FORMAT_VERSION};
pub use registry::ModelRegistry;

/// Catalogs at least this large get a progress bar while vectorising.
const PROGRESS_THRESHOLD: usize = 500;

/// Sparse vector with entries sorted by dimension index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_weights(weights: HashMap<usize, f64>) -> Self {
        let mut entries: Vec<(usize, f64)> = weights.into_iter().filter(|(_, w)| *w > 0.0).collect();
        entries.sort_by_key(|(idx, _)| *idx);
        let mut vector = Self { entries };
        vector.normalize();
        vector
    }

    fn normalize(&mut self) {
        let norm = self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in self.entries.iter_mut() {
                *value /= norm;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Dot product; equals cosine similarity for unit vectors.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_val) = self.entries[i];
            let (b_idx, b_val) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_val * b_val;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn fits(&self, dimension: usize) -> bool {
        self.entries.windows(2).all(|w| w[0].0 < w[1].0)
            && self.entries.iter().all(|(idx, value)| *idx < dimension && value.is_finite())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentModel {
    normalizer: Normalizer,
    tfidf: TfidfConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    rows: BTreeMap<String, SparseVector>,
    catalog_fingerprint: String,
    built_at: DateTime<Utc>,
}

impl ContentModel {
    /// Fit vocabulary and IDF weights on the catalog and vectorise every course.
    pub fn build(courses: &[Course], cfg: &TfidfConfig) -> RecommendResult<Self> {
        if courses.is_empty() {
            return Err(RecommendError::NoData);
        }

        let normalizer = Normalizer::from_config(cfg);
        let progress = if courses.len() >= PROGRESS_THRESHOLD {
            let bar = ProgressBar::new(courses.len() as u64);
            if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:30}] {pos}/{len}") {
                bar.set_style(style.progress_chars("=> "));
            }
            bar.set_message("Vectorising courses");
            bar
        } else {
            ProgressBar::hidden()
        };

        let tokenized: Vec<(String, Vec<String>)> = courses
            .par_iter()
            .map(|course| {
                let terms = normalizer.terms(&course.document_text());
                progress.inc(1);
                (course.code.clone(), terms)
            })
            .collect();
        progress.finish_and_clear();

        let mut documents: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (code, terms) in tokenized {
            if documents.insert(code.clone(), terms).is_some() {
                tracing::warn!("Duplicate course code {code} in catalog; keeping the last entry");
            }
        }

        let n_docs = documents.len();
        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in documents.values() {
            let unique: BTreeSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let max_doc_count = ((cfg.max_df * n_docs as f64).floor() as usize).max(cfg.min_df);
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::new();
        for (term, df) in &doc_freq {
            if *df < cfg.min_df || *df > max_doc_count {
                continue;
            }
            vocabulary.insert((*term).to_string(), idf.len());
            idf.push(((1.0 + n_docs as f64) / (1.0 + *df as f64)).ln() + 1.0);
        }
        tracing::debug!(
            "Vocabulary: kept {} of {} terms (min_df={}, max_doc_count={})",
            vocabulary.len(),
            doc_freq.len(),
            cfg.min_df,
            max_doc_count
        );

        if vocabulary.is_empty() {
            return Err(RecommendError::EmptyVocabulary);
        }

        let mut model = Self {
            normalizer,
            tfidf: cfg.clone(),
            vocabulary,
            idf,
            rows: BTreeMap::new(),
            catalog_fingerprint: catalog_fingerprint(courses),
            built_at: Utc::now(),
        };
        let rows: BTreeMap<String, SparseVector> = documents
            .par_iter()
            .map(|(code, terms)| (code.clone(), model.vectorize(terms)))
            .collect();
        model.rows = rows;

        tracing::info!(
            "Built content model: {} courses x {} terms",
            model.rows.len(),
            model.dimension()
        );
        Ok(model)
    }

    fn vectorize(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for term in terms {
            if let Some(&idx) = self.vocabulary.get(term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let weights = counts
            .into_iter()
            .map(|(idx, tf)| {
                let tf = if self.tfidf.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (idx, tf * self.idf[idx])
            })
            .collect();
        SparseVector::from_weights(weights)
    }

    /// Project free text into the model's vector space. Out-of-vocabulary
    /// terms are ignored; text with no known terms yields an empty vector.
    pub fn project(&self, text: &str) -> SparseVector {
        self.vectorize(&self.normalizer.terms(text))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn tfidf_config(&self) -> &TfidfConfig {
        &self.tfidf
    }

    /// Vocabulary size; every course vector lives in this many dimensions.
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &BTreeMap<String, SparseVector> {
        &self.rows
    }

    pub fn row(&self, course_code: &str) -> Option<&SparseVector> {
        self.rows.get(course_code)
    }

    pub fn contains(&self, course_code: &str) -> bool {
        self.rows.contains_key(course_code)
    }

    pub fn catalog_fingerprint(&self) -> &str {
        &self.catalog_fingerprint
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// The catalog changed since this model was built.
    pub fn is_stale(&self, courses: &[Course]) -> bool {
        self.catalog_fingerprint != catalog_fingerprint(courses)
    }

    /// Structural checks applied to artifacts read from disk.
    pub(crate) fn check_consistency(&self) -> RecommendResult<()> {
        let dimension = self.dimension();
        if self.idf.len() != dimension {
            return Err(RecommendError::ModelFormat(format!(
                "idf has {} weights for {} vocabulary terms",
                self.idf.len(),
                dimension
            )));
        }
        if self.vocabulary.values().any(|idx| *idx >= dimension) {
            return Err(RecommendError::ModelFormat("vocabulary index out of range".into()));
        }
        if let Some((code, _)) = self.rows.iter().find(|(_, row)| !row.fits(dimension)) {
            return Err(RecommendError::ModelFormat(format!(
                "vector for {code} does not fit dimension {dimension}"
            )));
        }
        Ok(())
    }
}
