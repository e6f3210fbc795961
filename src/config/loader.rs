//! Config file loading

use crate::domain::Config;
use anyhow::{Context, Result};
use figment::providers::{Env, Serialized};
use figment::Figment;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables with this prefix override file settings, using `__`
/// between section and key: `COURSE_REC_RANKING__TOP_N=5`.
pub const ENV_PREFIX: &str = "COURSE_REC_";

/// Section name a config file may nest its settings under.
const NESTED_SECTION: &str = "course-recommender";

const CANDIDATES: [&str; 5] = [
    "course-recommender.toml",
    ".course-recommender.toml",
    "recommender.toml",
    "recommender.yml",
    "recommender.yaml",
];

/// Load settings from an explicit file or one discovered in `work_dir`, then
/// apply environment overrides.
///
/// An explicitly named file must parse; a broken auto-discovered file only
/// warns and falls back to defaults.
pub fn load_config(work_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let from_file = load_file_config(work_dir, config_path)?;
    with_env_overrides(from_file, ENV_PREFIX)
}

fn load_file_config(work_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(work_dir),
    };

    let Some(config_file) = discovered else {
        return Ok(Config::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, &config_file),
        "yaml" | "yml" => parse_yaml_config(&content, &config_file),
        other => Err(anyhow::anyhow!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        )),
    };

    match parsed {
        Ok(cfg) => {
            tracing::debug!("Loaded config from {}", config_file.display());
            Ok(cfg)
        }
        Err(e) if explicit => Err(e),
        Err(e) => {
            tracing::warn!(
                "Ignoring auto-discovered config {}: {:#}",
                config_file.display(),
                e
            );
            Ok(Config::default())
        }
    }
}

/// Layer `PREFIX`-named environment variables over `base`.
pub fn with_env_overrides(base: Config, prefix: &str) -> Result<Config> {
    Figment::from(Serialized::defaults(base))
        .merge(Env::prefixed(prefix).split("__"))
        .extract()
        .context("Invalid configuration override in environment")
}

/// Parse TOML config, supporting a nested `[course-recommender]` section.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(NESTED_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(NESTED_SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(work_dir: &Path) -> Option<PathBuf> {
    CANDIDATES.iter().map(|candidate| work_dir.join(candidate)).find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlphaPolicy, FeedbackScope};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_nothing_is_found() {
        let tmp = TempDir::new().expect("tmp");
        let cfg = load_file_config(tmp.path(), None).expect("config");
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn discovers_toml_config() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("course-recommender.toml"),
            "[ranking]\ntop_n = 3\n\n[scoring]\nfeedback_scope = 'global'\n",
        )
        .expect("write");

        let cfg = load_file_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.ranking.top_n, 3);
        assert_eq!(cfg.scoring.feedback_scope, FeedbackScope::Global);
        assert_eq!(cfg.evaluation, Config::default().evaluation);
    }

    #[test]
    fn nested_section_is_unwrapped() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "[course-recommender.model]\nrebuild_on_import = true\n").expect("write");

        let cfg = load_file_config(tmp.path(), Some(&path)).expect("config");
        assert!(cfg.model.rebuild_on_import);
    }

    #[test]
    fn yaml_selects_linear_alpha_policy() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("recommender.yml"),
            "scoring:\n  alpha:\n    policy: linear\n    max_alpha: 0.8\n    min_alpha: 0.3\n    step: 0.05\n",
        )
        .expect("write");

        let cfg = load_file_config(tmp.path(), None).expect("config");
        assert_eq!(cfg.scoring.alpha, AlphaPolicy::linear_default());
    }

    #[test]
    fn explicit_invalid_config_is_an_error() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "[ranking]\ntop_n = 'many'\n").expect("write");
        assert!(load_file_config(tmp.path(), Some(&path)).is_err());

        let odd = tmp.path().join("config.ini");
        fs::write(&odd, "top_n=1").expect("write");
        assert!(load_file_config(tmp.path(), Some(&odd)).is_err());
    }

    #[test]
    fn auto_discovered_invalid_config_falls_back_to_defaults() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("recommender.toml"), "[ranking]\ntop_n = 'many'\n").expect("write");

        let cfg = load_file_config(tmp.path(), None).expect("should not error on auto-discovery");
        assert_eq!(cfg.ranking.top_n, Config::default().ranking.top_n);
    }

    #[test]
    fn environment_overrides_file_values() {
        let prefix = "COURSE_REC_LOADER_TEST_";
        std::env::set_var(format!("{prefix}RANKING__TOP_N"), "4");
        std::env::set_var(format!("{prefix}MODEL__REBUILD_ON_IMPORT"), "true");

        let mut base = Config::default();
        base.ranking.top_n = 7;
        let cfg = with_env_overrides(base, prefix).expect("merged");

        std::env::remove_var(format!("{prefix}RANKING__TOP_N"));
        std::env::remove_var(format!("{prefix}MODEL__REBUILD_ON_IMPORT"));

        assert_eq!(cfg.ranking.top_n, 4);
        assert!(cfg.model.rebuild_on_import);
        assert_eq!(cfg.scoring, Config::default().scoring);
    }
}
