//! Evaluate command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{load_registry, open_store, parse_csv, GlobalOptions};
use crate::config::CliOverrides;
use crate::eval::evaluate;
use crate::render::{render_evaluation_table, render_json, OutputFormat};
use crate::score::Recommender;

#[derive(Args)]
pub struct EvaluateArgs {
    /// Cut-offs to report (comma-separated, e.g. '3,5,10')
    #[arg(short = 'k', long, value_name = "LIST")]
    pub k: Option<String>,

    /// Lowest rating that counts as relevant
    #[arg(long, value_name = "STARS")]
    pub threshold: Option<u8>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: EvaluateArgs, globals: &GlobalOptions) -> Result<()> {
    let mut config = globals.settings(CliOverrides::default())?;
    if let Some(values) = parse_csv(&args.k) {
        config.evaluation.k_values = values
            .iter()
            .map(|v| v.parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid --k value: {e}"))?;
    }
    if let Some(threshold) = args.threshold {
        config.evaluation.relevance_threshold = threshold;
    }
    config.validate()?;

    let store = open_store(&config)?;
    let courses = store.courses()?;
    let feedback = store.all_feedback()?;
    let recommender = Recommender::new(load_registry(&config), &config);
    let report = evaluate(&recommender, &courses, &feedback, &config.evaluation)?;

    match args.format {
        OutputFormat::Text => {
            if report.students_evaluated == 0 {
                println!("No students with sufficient feedback to evaluate.");
            }
            print!("{}", render_evaluation_table(&report));
        }
        OutputFormat::Json | OutputFormat::Jsonl => print!("{}", render_json(&report)?),
    }
    Ok(())
}
