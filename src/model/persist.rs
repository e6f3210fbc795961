//! Model artifact persistence.
//!
//! The artifact is a versioned JSON document. Writes go to a sibling temp file
//! that is renamed into place, so a concurrent reload never reads a partial
//! artifact.

use super::ContentModel;
use crate::error::{RecommendError, RecommendResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format_version: u32,
    model: &'a ContentModel,
}

#[derive(Deserialize)]
struct Artifact {
    format_version: u32,
    model: ContentModel,
}

pub fn save_model(model: &ContentModel, path: &Path) -> RecommendResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_vec(&ArtifactRef { format_version: MODEL_FORMAT_VERSION, model })
        .map_err(|e| RecommendError::ModelFormat(e.to_string()))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload)?;
    fs::rename(&tmp, path)?;
    tracing::debug!("Saved content model to {}", path.display());
    Ok(())
}

pub fn load_model(path: &Path) -> RecommendResult<ContentModel> {
    let bytes = fs::read(path)?;
    let artifact: Artifact = serde_json::from_slice(&bytes)
        .map_err(|e| RecommendError::ModelFormat(format!("{}: {e}", path.display())))?;
    if artifact.format_version != MODEL_FORMAT_VERSION {
        return Err(RecommendError::ModelFormat(format!(
            "unsupported format version {}; expected {}",
            artifact.format_version, MODEL_FORMAT_VERSION
        )));
    }
    artifact.model.check_consistency()?;
    tracing::debug!(
        "Loaded content model from {} ({} courses x {} terms)",
        path.display(),
        artifact.model.len(),
        artifact.model.dimension()
    );
    Ok(artifact.model)
}
