//! Command-line interface for course-recommender
//!
//! Catalog and student management, model building, recommendations and
//! offline evaluation, all against a local SQLite store.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod catalog;
mod completions;
mod evaluate;
mod model;
mod recommend;
mod students;
mod utils;

use utils::GlobalOptions;

/// Hybrid content + collaborative course recommendations
#[derive(Parser)]
#[command(name = "course-recommender")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (course-recommender.toml or recommender.yml)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite store path
    #[arg(long, global = true, value_name = "FILE", env = "COURSE_REC_DB")]
    db: Option<PathBuf>,

    /// Content model artifact path
    #[arg(long, global = true, value_name = "FILE")]
    model: Option<PathBuf>,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the store (and optionally a default config file)
    Init(catalog::InitArgs),

    /// Import or update courses from a JSON or YAML file
    ImportCourses(catalog::ImportCoursesArgs),

    /// List the course catalog
    Courses(catalog::CoursesArgs),

    /// Mark a course as offered or not offered this semester
    SetAvailability(catalog::SetAvailabilityArgs),

    /// Register a student
    AddStudent(students::AddStudentArgs),

    /// List registered students
    Students(students::StudentsArgs),

    /// Record or show a student's preferences
    Preferences(students::PreferencesArgs),

    /// Rate a course (replaces an earlier rating of the same course)
    Feedback(students::FeedbackArgs),

    /// Enroll a student in a course
    Enroll(students::EnrollmentArgs),

    /// Drop an active enrollment
    Drop(students::EnrollmentArgs),

    /// Show or extend a student's transcript
    Transcript(students::TranscriptArgs),

    /// Fit the content model on the current catalog
    BuildModel(model::BuildModelArgs),

    /// Describe the persisted content model
    ModelInfo(model::ModelInfoArgs),

    /// Recommend courses for a student
    Recommend(recommend::RecommendArgs),

    /// Measure ranking quality against recorded feedback
    Evaluate(evaluate::EvaluateArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let globals = GlobalOptions { config: cli.config, db: cli.db, model: cli.model };

    match cli.command {
        Commands::Init(args) => catalog::run_init(args, &globals),
        Commands::ImportCourses(args) => catalog::run_import(args, &globals),
        Commands::Courses(args) => catalog::run_courses(args, &globals),
        Commands::SetAvailability(args) => catalog::run_set_availability(args, &globals),
        Commands::AddStudent(args) => students::run_add_student(args, &globals),
        Commands::Students(args) => students::run_students(args, &globals),
        Commands::Preferences(args) => students::run_preferences(args, &globals),
        Commands::Feedback(args) => students::run_feedback(args, &globals),
        Commands::Enroll(args) => students::run_enroll(args, &globals),
        Commands::Drop(args) => students::run_drop(args, &globals),
        Commands::Transcript(args) => students::run_transcript(args, &globals),
        Commands::BuildModel(args) => model::run_build(args, &globals),
        Commands::ModelInfo(args) => model::run_info(args, &globals),
        Commands::Recommend(args) => recommend::run(args, &globals),
        Commands::Evaluate(args) => evaluate::run(args, &globals),
        Commands::Completions(args) => completions::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
