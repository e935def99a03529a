//! Suite configuration loading, validation, and env substitution.
//!
//! Config files: `argus.toml`, `argus.yaml`, or `argus.json`.
//! Searched in `./` then `~/.config/argus/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{PageSpec, RenderConfig, ReportConfig, SnapshotConfig, SuiteConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
