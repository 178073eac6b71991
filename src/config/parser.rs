//! Config file loading and validation

use crate::config::Config;
use crate::{ConfigError, ConfigResult};
use std::path::Path;

/// Loads and validates a configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates a configuration structure
///
/// Checks that numeric settings fall in sane ranges and that the default
/// scraper backend names a known implementation.
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if config.analysis.batch_concurrency == 0 || config.analysis.batch_concurrency > 16 {
        return Err(ConfigError::Validation(format!(
            "batch-concurrency must be between 1 and 16, got {}",
            config.analysis.batch_concurrency
        )));
    }

    if config.analysis.deadline_seconds == 0 {
        return Err(ConfigError::Validation(
            "deadline-seconds must be greater than zero".to_string(),
        ));
    }

    if config.scraper.backend != "headless" && config.scraper.backend != "api" {
        return Err(ConfigError::Validation(format!(
            "scraper backend must be \"headless\" or \"api\", got \"{}\"",
            config.scraper.backend
        )));
    }

    if config.scraper.request_timeout_seconds == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-seconds must be greater than zero".to_string(),
        ));
    }

    if config.limits.max_requests == 0 || config.limits.window_seconds == 0 {
        return Err(ConfigError::Validation(
            "limits.max-requests and limits.window-seconds must be greater than zero".to_string(),
        ));
    }

    if config.output.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "output.database-path must not be empty".to_string(),
        ));
    }

    Ok(())
}
