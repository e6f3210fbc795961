//! Configuration loading and merging
//!
//! Settings come from a config file, `COURSE_REC_*` environment variables and
//! CLI flags, with precedence CLI > Env > File > Defaults.

pub mod loader;
pub mod merge;

pub use loader::{load_config, ENV_PREFIX};
pub use merge::{merge_cli_with_config, CliOverrides};
