/// `load_config` module: turns an optional YAML file plus environment overrides
/// into the core's [`IntakeConfig`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file; every key is optional and missing keys
///   keep their built-in defaults
/// - Apply environment overrides (`TRANSFER_INTAKE_WORK_ROOT`)
/// - Report read and parse failures with the offending path, for the CLI boundary
///
/// For the accepted schema, see `intake.example.yaml` at the repository root.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use transfer_intake_core::config::IntakeConfig;

/// Environment variable that overrides `work_root`.
pub const WORK_ROOT_ENV: &str = "TRANSFER_INTAKE_WORK_ROOT";

/// Loads a YAML config file and applies environment overrides.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<IntakeConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = fs::read_to_string(path_ref)
        .inspect_err(|e| error!(error = ?e, config_path = ?path_ref, "Failed to read config file"))
        .with_context(|| format!("Failed to read config file {}", path_ref.display()))?;

    let mut config = parse_config(&config_content)
        .inspect_err(|e| error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML"))?;
    info!(config_path = ?path_ref, "Parsed config YAML successfully");

    apply_env_overrides(&mut config);
    config.trace_loaded();
    Ok(config)
}

/// Uses the file at `path` when given, otherwise the built-in defaults.
/// Environment overrides apply in both cases.
pub fn resolve_config(path: Option<&Path>) -> Result<IntakeConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            info!("No config file given, using built-in defaults");
            let mut config = IntakeConfig::default();
            apply_env_overrides(&mut config);
            config.trace_loaded();
            Ok(config)
        }
    }
}

/// Parses YAML config text. An empty document yields the defaults.
pub fn parse_config(content: &str) -> Result<IntakeConfig> {
    if content.trim().is_empty() {
        return Ok(IntakeConfig::default());
    }
    serde_yaml::from_str(content).context("Failed to parse config YAML")
}

fn apply_env_overrides(config: &mut IntakeConfig) {
    if let Ok(root) = std::env::var(WORK_ROOT_ENV) {
        if !root.is_empty() {
            info!(env = WORK_ROOT_ENV, work_root = %root, "Work root overridden from environment");
            config.work_root = PathBuf::from(root);
        }
    }
}
