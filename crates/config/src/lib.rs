//! Configuration loading, env substitution and validation.
//!
//! Config files: `loglane.toml`, `loglane.yaml`, or `loglane.json`
//! Searched in `./` then `~/.config/loglane/`.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw
//! file before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config, load_config_value},
    schema::{ChannelSection, LoglaneConfig},
    validate::{Diagnostic, Severity, ValidationResult},
};
