//! Shared CLI utilities.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{load_config, merge_cli_with_config, CliOverrides};
use crate::domain::Config;
use crate::model::ModelRegistry;
use crate::store::Store;

/// Parse a comma-separated string into a `Vec<String>`, trimming whitespace and
/// discarding empty segments.  Returns `None` when `value` is `None`.
pub fn parse_csv(value: &Option<String>) -> Option<Vec<String>> {
    value.as_ref().map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.to_string())
            .collect::<Vec<_>>()
    })
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub model: Option<PathBuf>,
}

impl GlobalOptions {
    /// Resolve the effective configuration for a command.
    pub fn settings(&self, mut overrides: CliOverrides) -> Result<Config> {
        let cwd = std::env::current_dir().context("Failed to read working directory")?;
        let loaded = load_config(&cwd, self.config.as_deref())?;
        overrides.database = overrides.database.or_else(|| self.db.clone());
        overrides.model_path = overrides.model_path.or_else(|| self.model.clone());
        let config = merge_cli_with_config(loaded, &overrides);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

pub fn open_store(config: &Config) -> Result<Store> {
    Store::open(&config.store.database)
}

/// Registry holding the persisted model, or an empty one when no usable
/// artifact exists yet.
pub fn load_registry(config: &Config) -> Arc<ModelRegistry> {
    let registry = Arc::new(ModelRegistry::new());
    let path = &config.model.path;
    if !path.exists() {
        tracing::debug!("No content model at {}", path.display());
        return registry;
    }
    if let Err(err) = registry.reload(path) {
        tracing::warn!("Could not load content model {}: {}", path.display(), err);
    }
    registry
}
