//! Content model commands

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::utils::{open_store, GlobalOptions};
use crate::config::CliOverrides;
use crate::domain::Config;
use crate::model::{load_model, save_model, ContentModel};
use crate::render::{render_json, OutputFormat};
use crate::store::Store;
use crate::utils::{catalog_fingerprint, format_with_commas, short_hash};

/// Fit a fresh model on the stored catalog and persist it.
pub fn rebuild_model(store: &Store, config: &Config) -> Result<ContentModel> {
    let courses = store.courses()?;
    let model = ContentModel::build(&courses, &config.model.tfidf)
        .context("Failed to build content model from the course catalog")?;
    save_model(&model, &config.model.path)
        .with_context(|| format!("Failed to save content model to {}", config.model.path.display()))?;
    tracing::info!(
        "Saved content model to {} ({} courses x {} terms)",
        config.model.path.display(),
        model.len(),
        model.dimension()
    );
    Ok(model)
}

#[derive(Args)]
pub struct BuildModelArgs {}

pub fn run_build(_args: BuildModelArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;
    let model = rebuild_model(&store, &config)?;
    println!(
        "Built content model: {} courses, {} terms -> {}",
        format_with_commas(model.len() as u64),
        format_with_commas(model.dimension() as u64),
        config.model.path.display()
    );
    Ok(())
}

#[derive(Args)]
pub struct ModelInfoArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    path: String,
    built_at: String,
    courses: usize,
    vocabulary: usize,
    ngram_range: (usize, usize),
    fingerprint: String,
    catalog_fingerprint: String,
    stale: bool,
}

pub fn run_info(args: ModelInfoArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let model = load_model(&config.model.path)
        .with_context(|| format!("No usable content model at {}", config.model.path.display()))?;
    let courses = open_store(&config)?.courses()?;
    let tfidf = model.tfidf_config();

    let info = ModelInfo {
        path: config.model.path.display().to_string(),
        built_at: model.built_at().to_rfc3339(),
        courses: model.len(),
        vocabulary: model.dimension(),
        ngram_range: (tfidf.ngram_min, tfidf.ngram_max),
        fingerprint: model.catalog_fingerprint().to_string(),
        catalog_fingerprint: catalog_fingerprint(&courses),
        stale: model.is_stale(&courses),
    };

    match args.format {
        OutputFormat::Text => {
            println!("Model: {}", info.path);
            println!("  Built at: {}", info.built_at);
            println!("  Courses: {}", format_with_commas(info.courses as u64));
            println!("  Vocabulary: {} terms", format_with_commas(info.vocabulary as u64));
            println!("  N-gram range: {}-{}", info.ngram_range.0, info.ngram_range.1);
            println!("  Catalog fingerprint: {}", short_hash(&info.fingerprint));
            if info.stale {
                println!(
                    "  Status: stale (catalog is now {}); run `course-recommender build-model`",
                    short_hash(&info.catalog_fingerprint)
                );
            } else {
                println!("  Status: up to date");
            }
        }
        OutputFormat::Json | OutputFormat::Jsonl => print!("{}", render_json(&info)?),
    }
    Ok(())
}
