//! Store initialisation and catalog commands

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::model::rebuild_model;
use super::utils::{open_store, GlobalOptions};
use crate::config::CliOverrides;
use crate::domain::Config;
use crate::render::{render_courses_table, render_json, render_json_lines, OutputFormat};
use crate::store::read_course_file;

const DEFAULT_CONFIG_FILE: &str = "course-recommender.toml";

#[derive(Args)]
pub struct InitArgs {
    /// Also write a config file with every default setting
    #[arg(long)]
    pub write_config: bool,
}

pub fn run_init(args: InitArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    open_store(&config)?;
    println!("Initialised store at {}", config.store.database.display());

    if args.write_config {
        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        if path.exists() {
            bail!("{} already exists; not overwriting", path.display());
        }
        let rendered = toml::to_string_pretty(&Config::default())?;
        std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote default configuration to {}", path.display());
    }
    Ok(())
}

#[derive(Args)]
pub struct ImportCoursesArgs {
    /// JSON or YAML file holding an array of courses
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Rebuild the content model after importing
    #[arg(long)]
    pub rebuild: bool,
}

pub fn run_import(args: ImportCoursesArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let courses = read_course_file(&args.file)?;
    if courses.is_empty() {
        bail!("No courses found in {}", args.file.display());
    }

    let mut store = open_store(&config)?;
    let count = store.upsert_courses(&courses)?;
    println!("Imported {} courses from {}", count, args.file.display());

    if args.rebuild || config.model.rebuild_on_import {
        let model = rebuild_model(&store, &config)?;
        println!("Rebuilt content model: {} courses, {} terms", model.len(), model.dimension());
    } else {
        println!("Run `course-recommender build-model` to refresh the content model");
    }
    Ok(())
}

#[derive(Args)]
pub struct CoursesArgs {
    /// Only list courses offered this semester
    #[arg(long)]
    pub available_only: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run_courses(args: CoursesArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;
    let mut courses = store.courses()?;
    if args.available_only {
        courses.retain(|c| c.available);
    }

    match args.format {
        OutputFormat::Text if courses.is_empty() => println!("No courses in catalog."),
        OutputFormat::Text => print!("{}", render_courses_table(&courses)),
        OutputFormat::Json => print!("{}", render_json(&courses)?),
        OutputFormat::Jsonl => print!("{}", render_json_lines(&courses)?),
    }
    Ok(())
}

#[derive(Args)]
pub struct SetAvailabilityArgs {
    /// Course code
    #[arg(value_name = "CODE")]
    pub code: String,

    /// Mark the course as offered this semester
    #[arg(long, conflicts_with = "unavailable", required_unless_present = "unavailable")]
    pub available: bool,

    /// Mark the course as not offered this semester
    #[arg(long)]
    pub unavailable: bool,
}

pub fn run_set_availability(args: SetAvailabilityArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides::default())?;
    let store = open_store(&config)?;
    store.set_availability(&args.code, args.available)?;
    let state = if args.available { "available" } else { "unavailable" };
    println!("{} is now {}", args.code, state);
    Ok(())
}
