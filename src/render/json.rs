//! JSON rendering for machine consumers.

use crate::domain::RecommendationResult;
use anyhow::Result;
use serde::Serialize;

/// Pretty-printed JSON array of recommendations, newline-terminated.
pub fn render_recommendations_json(results: &[RecommendationResult]) -> Result<String> {
    render_json(&results)
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(format!("{}\n", serde_json::to_string_pretty(value)?))
}

/// One compact JSON document per line.
pub fn render_json_lines<T: Serialize>(items: &[T]) -> Result<String> {
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        lines.push(serde_json::to_string(item)?);
    }
    if lines.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{}\n", lines.join("\n")))
    }
}
