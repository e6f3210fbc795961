//! Recommend command implementation

use anyhow::{bail, Result};
use clap::Args;

use super::utils::{load_registry, open_store, GlobalOptions};
use crate::config::CliOverrides;
use crate::domain::FeedbackScope;
use crate::render::{
    render_json_lines, render_recommendations_json, render_recommendations_table, OutputFormat,
};
use crate::score::{RecommendationRequest, Recommender};

#[derive(Args)]
pub struct RecommendArgs {
    /// Student id
    #[arg(value_name = "STUDENT")]
    pub student: String,

    /// Number of recommendations to return
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub top_n: Option<usize>,

    /// Also recommend courses not offered this semester
    #[arg(long)]
    pub include_unavailable: bool,

    /// Whose ratings feed the collaborative score
    #[arg(long, value_enum, value_name = "SCOPE")]
    pub scope: Option<Scope>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Scope {
    Student,
    Global,
}

impl From<Scope> for FeedbackScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Student => FeedbackScope::Student,
            Scope::Global => FeedbackScope::Global,
        }
    }
}

pub fn run(args: RecommendArgs, globals: &GlobalOptions) -> Result<()> {
    let config = globals.settings(CliOverrides {
        top_n: args.top_n,
        include_unavailable: args.include_unavailable.then_some(true),
        feedback_scope: args.scope.map(Into::into),
        ..CliOverrides::default()
    })?;
    let store = open_store(&config)?;
    if store.student(&args.student)?.is_none() {
        bail!("Unknown student id: {}", args.student);
    }

    let courses = store.courses()?;
    let registry = load_registry(&config);
    if let Some(model) = registry.current() {
        if model.is_stale(&courses) {
            tracing::warn!("Content model is older than the catalog; run `course-recommender build-model`");
        }
    }

    let request = RecommendationRequest {
        student_id: args.student.clone(),
        preference: store.latest_preference(&args.student)?,
        taken: store.taken_courses(&args.student)?,
        feedback: store.feedback_in_scope(&args.student, config.scoring.feedback_scope)?,
    };
    tracing::debug!(
        "Request for {}: {} taken, {} feedback records in scope",
        request.student_id,
        request.taken.len(),
        request.feedback.len()
    );

    let recommender = Recommender::new(registry, &config);
    let results = recommender.recommend(&courses, &request)?;

    match args.format {
        OutputFormat::Text => print!("{}", render_recommendations_table(&results)),
        OutputFormat::Json => print!("{}", render_recommendations_json(&results)?),
        OutputFormat::Jsonl => print!("{}", render_json_lines(&results)?),
    }
    Ok(())
}
