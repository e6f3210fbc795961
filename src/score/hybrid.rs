//! Adaptive blending of content and collaborative scores.

use super::ScoreMap;
use crate::domain::{AlphaPolicy, BoostConfig};
use crate::error::{RecommendError, RecommendResult};

impl AlphaPolicy {
    /// Weight on content similarity for a student with `feedback_count` ratings.
    ///
    /// Always within `[min_alpha, max_alpha]` and non-increasing in the count
    /// for any policy that passed [`AlphaPolicy::validate`].
    pub fn alpha(&self, feedback_count: usize) -> f64 {
        match self {
            AlphaPolicy::Stepped { tiers, min_alpha, max_alpha } => tiers
                .iter()
                .find(|tier| feedback_count < tier.below)
                .map(|tier| tier.alpha)
                .unwrap_or(*min_alpha)
                .clamp(*min_alpha, *max_alpha),
            AlphaPolicy::Linear { max_alpha, min_alpha, step } => {
                (max_alpha - feedback_count as f64 * step).clamp(*min_alpha, *max_alpha)
            }
        }
    }
}

/// `alpha * content + (1 - alpha) * collaborative` for every course code.
///
/// Both maps must cover exactly `course_codes`; anything else is a caller bug
/// and is reported instead of padded or truncated.
pub fn combine(
    course_codes: &[&str],
    content: &ScoreMap,
    collaborative: &ScoreMap,
    alpha: f64,
) -> RecommendResult<ScoreMap> {
    let aligned = content.len() == course_codes.len()
        && collaborative.len() == course_codes.len()
        && course_codes.iter().all(|code| content.contains_key(*code) && collaborative.contains_key(*code));
    if !aligned {
        return Err(RecommendError::AlignmentViolation {
            expected: course_codes.len(),
            content: content.len(),
            collaborative: collaborative.len(),
        });
    }

    Ok(course_codes
        .iter()
        .map(|code| {
            let c = content[*code];
            let r = collaborative[*code];
            ((*code).to_string(), alpha * c + (1.0 - alpha) * r)
        })
        .collect())
}

/// Convert a combined score in [0, 1] to the capped 0–99 display scale,
/// boosting it when the course is in the student's preferred group.
pub fn display_score(combined: f64, in_preferred_group: bool, boost: &BoostConfig) -> f64 {
    let raw = combined * 100.0;
    if in_preferred_group {
        (raw.max(boost.floor) * boost.factor).min(boost.cap)
    } else {
        raw.min(boost.cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AlphaTier;

    #[test]
    fn stepped_reference_boundaries() {
        let policy = AlphaPolicy::default();
        assert_eq!(policy.alpha(0), 0.9);
        assert_eq!(policy.alpha(1), 0.8);
        assert_eq!(policy.alpha(4), 0.8);
        assert_eq!(policy.alpha(5), 0.6);
        assert_eq!(policy.alpha(19), 0.6);
        assert_eq!(policy.alpha(20), 0.3);
        assert_eq!(policy.alpha(usize::MAX), 0.3);
    }

    #[test]
    fn linear_reference_boundaries() {
        let policy = AlphaPolicy::linear_default();
        assert_eq!(policy.alpha(0), 0.8);
        assert!((policy.alpha(2) - 0.7).abs() < 1e-12);
        assert!((policy.alpha(10) - 0.3).abs() < 1e-12);
        assert_eq!(policy.alpha(11), 0.3);
        assert_eq!(policy.alpha(1_000_000), 0.3);
    }

    #[test]
    fn alpha_is_monotone_and_bounded() {
        let custom = AlphaPolicy::Stepped {
            tiers: vec![AlphaTier { below: 3, alpha: 0.7 }, AlphaTier { below: 10, alpha: 0.5 }],
            min_alpha: 0.2,
            max_alpha: 0.7,
        };
        for policy in [AlphaPolicy::default(), AlphaPolicy::linear_default(), custom] {
            let (min_alpha, max_alpha) = policy.bounds();
            let mut prev = f64::INFINITY;
            for count in 0..100 {
                let alpha = policy.alpha(count);
                assert!(alpha <= prev, "alpha increased at count {count}");
                assert!((min_alpha..=max_alpha).contains(&alpha));
                prev = alpha;
            }
        }
    }

    #[test]
    fn combine_is_convex_per_course() {
        let content: ScoreMap = [("A".to_string(), 1.0), ("B".to_string(), 0.0)].into();
        let collab: ScoreMap = [("A".to_string(), 0.0), ("B".to_string(), 1.0)].into();
        let combined = combine(&["A", "B"], &content, &collab, 0.8).expect("aligned");
        assert!((combined["A"] - 0.8).abs() < 1e-12);
        assert!((combined["B"] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn combine_rejects_length_mismatch() {
        let content: ScoreMap = [("A".to_string(), 1.0)].into();
        let collab: ScoreMap = [("A".to_string(), 0.0), ("B".to_string(), 1.0)].into();
        let err = combine(&["A", "B"], &content, &collab, 0.5).expect_err("misaligned");
        assert!(matches!(
            err,
            RecommendError::AlignmentViolation { expected: 2, content: 1, collaborative: 2 }
        ));
    }

    #[test]
    fn combine_rejects_different_keys_of_same_length() {
        let content: ScoreMap = [("A".to_string(), 1.0), ("C".to_string(), 1.0)].into();
        let collab: ScoreMap = [("A".to_string(), 0.0), ("B".to_string(), 1.0)].into();
        assert!(combine(&["A", "B"], &content, &collab, 0.5).is_err());
    }

    #[test]
    fn boost_matches_reference_formula() {
        let boost = BoostConfig::default();
        assert!((display_score(0.40, true, &boost) - 60.0).abs() < 1e-9);
        assert!((display_score(0.40, false, &boost) - 40.0).abs() < 1e-9);
        // Floor lifts weak matches before boosting.
        assert!((display_score(0.02, true, &boost) - 15.0).abs() < 1e-9);
        // Cap applies to boosted and plain scores alike.
        assert_eq!(display_score(0.90, true, &boost), 99.0);
        assert_eq!(display_score(1.0, false, &boost), 99.0);
    }

    #[test]
    fn boost_formula_holds_across_range() {
        let boost = BoostConfig::default();
        for step in 0..=100 {
            let s = step as f64;
            let expected = (s.max(10.0) * 1.5).min(99.0);
            assert!((display_score(s / 100.0, true, &boost) - expected).abs() < 1e-9);
        }
    }
}
