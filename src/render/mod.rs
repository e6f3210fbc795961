//! Output rendering (text tables, JSON)

use clap::ValueEnum;

pub mod json;
pub mod table;

pub use json::{render_json, render_json_lines, render_recommendations_json};
pub use table::{render_courses_table, render_evaluation_table, render_recommendations_table, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table for terminals
    #[default]
    Text,
    /// Pretty-printed JSON array
    Json,
    /// One JSON object per line
    Jsonl,
}
