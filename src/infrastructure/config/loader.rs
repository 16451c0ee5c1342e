use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use reqwest::Url;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Directory holding project-local configuration and the default database.
pub const CONFIG_DIR: &str = ".sportcache";

/// Prefix for environment overrides, e.g. `SPORTCACHE_LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "SPORTCACHE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid {0}: must be greater than 0")]
    ZeroInterval(&'static str),

    #[error("Invalid upstream base_url: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid preload concurrency: must be at least 1")]
    ZeroConcurrency,

    #[error("Invalid cache.max_consecutive_failures: must be at least 1")]
    ZeroFailureLimit,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the current directory.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .sportcache/config.yaml (project config, created by init)
    /// 3. .sportcache/local.yaml (local overrides, optional)
    /// 4. Environment variables (SPORTCACHE_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Load configuration rooted at `base`, so `base/.sportcache/` is searched.
    pub fn load_from_dir(base: impl AsRef<Path>) -> Result<Config> {
        let dir = base.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file; environment overrides still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.cache.sweep_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("cache.sweep_interval_secs"));
        }

        if config.cache.preload_interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("cache.preload_interval_secs"));
        }

        if config.cache.max_consecutive_failures == 0 {
            return Err(ConfigError::ZeroFailureLimit);
        }

        if config.upstream.timeout_secs == 0 {
            return Err(ConfigError::ZeroInterval("upstream.timeout_secs"));
        }

        if Url::parse(&config.upstream.base_url).is_err() {
            return Err(ConfigError::InvalidBaseUrl(config.upstream.base_url.clone()));
        }

        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        if config.preload.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        Ok(())
    }
}
