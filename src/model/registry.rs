//! Process-wide holder of the current content model.
//!
//! Readers clone an `Arc` and score without holding the lock. A reload builds
//! or reads the complete replacement first and only then swaps the pointer, so
//! no reader ever observes a partially loaded model.

use super::{load_model, ContentModel};
use crate::error::{RecommendError, RecommendResult};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct ModelRegistry {
    current: RwLock<Option<Arc<ContentModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(model: ContentModel) -> Self {
        Self { current: RwLock::new(Some(Arc::new(model))) }
    }

    /// Snapshot of the loaded model, if any.
    pub fn current(&self) -> Option<Arc<ContentModel>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Snapshot of the loaded model, or `ModelNotReady`.
    pub fn require(&self) -> RecommendResult<Arc<ContentModel>> {
        self.current().ok_or(RecommendError::ModelNotReady)
    }

    pub fn is_ready(&self) -> bool {
        self.current().is_some()
    }

    /// Swap in a new model; returns the one it replaced.
    pub fn install(&self, model: ContentModel) -> Option<Arc<ContentModel>> {
        let next = Arc::new(model);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        guard.replace(next)
    }

    /// Load the artifact at `path` and swap it in. On failure the previous
    /// model stays installed.
    pub fn reload(&self, path: &Path) -> RecommendResult<()> {
        let model = load_model(path)?;
        tracing::info!(
            "Reloaded content model from {} ({} courses x {} terms)",
            path.display(),
            model.len(),
            model.dimension()
        );
        self.install(model);
        Ok(())
    }
}
