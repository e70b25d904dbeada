//! `framegrab-config`: runtime configuration management.
//!
//! Provides:
//! - Typed config schema (extract, output, logging)
//! - YAML loading with a default when the file is absent
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with warnings and errors

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_file_path, load_config, parse_config, render_config};
pub use schema::{ExtractConfig, FramegrabConfig, LoggingConfig, OutputConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, substitute env vars, apply defaults and validate a config file.
///
/// Validation findings are logged and returned alongside the config so the
/// caller decides whether errors are fatal.
pub async fn load_and_prepare(path: &Path) -> Result<(FramegrabConfig, ValidationReport)> {
    let raw_config = load_config(path).await?;
    let config = prepare(raw_config)?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }

    Ok((config, report))
}

/// Env substitution and defaults, without touching the filesystem.
pub fn prepare(config: FramegrabConfig) -> Result<FramegrabConfig> {
    let value: Value =
        serde_json::to_value(&config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: FramegrabConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    Ok(apply_all_defaults(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepares_missing_file_into_full_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (cfg, report) = load_and_prepare(&dir.path().join("none.yaml")).await.unwrap();
        assert!(report.is_valid());
        assert_eq!(cfg.extract.unwrap().initial_window, Some(defaults::DEFAULT_INITIAL_WINDOW));
    }
}
