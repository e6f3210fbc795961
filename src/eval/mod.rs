//! Offline ranking quality metrics over recorded feedback.

use crate::domain::{Course, EvaluationConfig, FeedbackRecord};
use crate::error::RecommendResult;
use crate::rank::ranked_codes;
use crate::score::Recommender;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Fraction of the first `k` recommendations that are relevant. Always divides by `k`.
pub fn precision_at_k(recommended: &[String], relevant: &[String], k: usize) -> f64 {
    let top = &recommended[..k.min(recommended.len())];
    if top.is_empty() || k == 0 {
        return 0.0;
    }
    let relevant: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    top.iter().filter(|code| relevant.contains(code.as_str())).count() as f64 / k as f64
}

pub fn recall_at_k(recommended: &[String], relevant: &[String], k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let top = &recommended[..k.min(recommended.len())];
    let wanted: HashSet<&str> = relevant.iter().map(String::as_str).collect();
    top.iter().filter(|code| wanted.contains(code.as_str())).count() as f64 / relevant.len() as f64
}

/// 1.0 when any of the first `k` recommendations is relevant.
pub fn hit_rate_at_k(recommended: &[String], relevant: &[String], k: usize) -> f64 {
    let top = &recommended[..k.min(recommended.len())];
    if top.iter().any(|code| relevant.contains(code)) {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsAtK {
    pub k: usize,
    pub precision: f64,
    pub recall: f64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub students_evaluated: usize,
    pub relevance_threshold: u8,
    pub metrics: Vec<MetricsAtK>,
}

/// Replay every student's feedback through the hybrid scorer and measure how
/// well the unfiltered ranking recovers the courses they rated highly.
///
/// Students without feedback or without any relevant rating are skipped.
pub fn evaluate(
    recommender: &Recommender,
    courses: &[Course],
    feedback: &[FeedbackRecord],
    cfg: &EvaluationConfig,
) -> RecommendResult<EvaluationReport> {
    let mut by_student: BTreeMap<&str, Vec<FeedbackRecord>> = BTreeMap::new();
    for record in feedback {
        by_student.entry(record.student_id.as_str()).or_default().push(record.clone());
    }

    let mut sums: Vec<(f64, f64, f64)> = vec![(0.0, 0.0, 0.0); cfg.k_values.len()];
    let mut evaluated = 0usize;

    for (student_id, own) in &by_student {
        let relevant: Vec<String> = own
            .iter()
            .filter(|f| f.rating >= cfg.relevance_threshold)
            .map(|f| f.course_code.clone())
            .collect();
        if relevant.is_empty() {
            tracing::debug!("Skipping {}: no ratings at or above threshold", student_id);
            continue;
        }

        let comments: Vec<&str> = own.iter().map(|f| f.comment.trim()).filter(|c| !c.is_empty()).collect();
        let query = if comments.is_empty() {
            recommender.fallback_profile().to_string()
        } else {
            comments.join(" ")
        };

        let scores = recommender.score_courses(&query, courses, own, None)?;
        let ranked = ranked_codes(&scores);
        for (slot, k) in sums.iter_mut().zip(&cfg.k_values) {
            slot.0 += precision_at_k(&ranked, &relevant, *k);
            slot.1 += recall_at_k(&ranked, &relevant, *k);
            slot.2 += hit_rate_at_k(&ranked, &relevant, *k);
        }
        evaluated += 1;
        tracing::debug!("Evaluated {} with {} relevant courses", student_id, relevant.len());
    }

    let denom = evaluated.max(1) as f64;
    let metrics = cfg
        .k_values
        .iter()
        .zip(sums)
        .map(|(k, (p, r, h))| MetricsAtK { k: *k, precision: p / denom, recall: r / denom, hit_rate: h / denom })
        .collect();

    Ok(EvaluationReport {
        students_evaluated: evaluated,
        relevance_threshold: cfg.relevance_threshold,
        metrics,
    })
}
