use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use marquee_queue::SchedulerConfig;

use crate::cli::CliArgs;

/// Return the default config file path: ~/.config/marquee/config.toml
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("could not determine user config directory")?
        .join("marquee");
    Ok(config_dir.join("config.toml"))
}

/// Load scheduler config from the given path, or the default path.
/// Returns defaults (with env overrides) if the file does not exist.
pub fn load(path: Option<&str>) -> Result<SchedulerConfig> {
    let config_path = match path {
        Some(p) => PathBuf::from(p),
        None => default_config_path()?,
    };

    if config_path.exists() {
        debug!(?config_path, "Loading config");
        SchedulerConfig::from_file(&config_path)
            .with_context(|| format!("failed to load config: {}", config_path.display()))
    } else {
        debug!(?config_path, "Config file not found, using defaults");
        let mut config = SchedulerConfig::default();
        config.apply_env_overrides();
        config.validate().context("invalid config from environment")?;
        Ok(config)
    }
}

/// Apply command-line overrides on top of the loaded config.
pub fn apply_args(mut config: SchedulerConfig, args: &CliArgs) -> Result<SchedulerConfig> {
    if let Some(ms) = args.max_timeout_ms {
        config.max_timeout_ms = ms;
    }
    if args.allow_duplicates {
        config.skip_duplicate_messages = false;
    }
    config.validate().context("invalid command-line options")?;
    Ok(config)
}
