//! Command-line overrides layered on top of file and environment settings.

use crate::domain::{Config, FeedbackScope};
use std::path::PathBuf;

/// Settings the CLI can override. `None` leaves the loaded value untouched.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub top_n: Option<usize>,
    pub include_unavailable: Option<bool>,
    pub feedback_scope: Option<FeedbackScope>,
}

pub fn merge_cli_with_config(mut config: Config, cli: &CliOverrides) -> Config {
    if let Some(database) = &cli.database {
        config.store.database = database.clone();
    }
    if let Some(path) = &cli.model_path {
        config.model.path = path.clone();
    }
    if let Some(top_n) = cli.top_n {
        config.ranking.top_n = top_n;
    }
    if let Some(include) = cli.include_unavailable {
        config.ranking.include_unavailable = include;
    }
    if let Some(scope) = cli.feedback_scope {
        config.scoring.feedback_scope = scope;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_keep_config() {
        let mut base = Config::default();
        base.ranking.top_n = 3;
        let merged = merge_cli_with_config(base.clone(), &CliOverrides::default());
        similar_asserts::assert_eq!(merged, base);
    }

    #[test]
    fn cli_values_win() {
        let overrides = CliOverrides {
            database: Some(PathBuf::from("other.sqlite")),
            top_n: Some(2),
            include_unavailable: Some(true),
            feedback_scope: Some(FeedbackScope::Global),
            ..CliOverrides::default()
        };
        let merged = merge_cli_with_config(Config::default(), &overrides);
        assert_eq!(merged.store.database, PathBuf::from("other.sqlite"));
        assert_eq!(merged.model.path, Config::default().model.path);
        assert_eq!(merged.ranking.top_n, 2);
        assert!(merged.ranking.include_unavailable);
        assert_eq!(merged.scoring.feedback_scope, FeedbackScope::Global);
    }
}
