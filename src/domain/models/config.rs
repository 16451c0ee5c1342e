use serde::{Deserialize, Serialize};

use super::ttl_policy::TtlPolicy;

/// Main configuration structure for sportcache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cache maintenance and TTL configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upstream sports API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Retry policy for upstream requests
    #[serde(default)]
    pub retry: RetryConfig,

    /// Preload configuration
    #[serde(default)]
    pub preload: PreloadConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".sportcache/cache.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// `sqlx` connection URL for the configured path.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation for file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Cache maintenance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Seconds between expiry sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Seconds between preload runs
    #[serde(default = "default_preload_interval_secs")]
    pub preload_interval_secs: u64,

    /// Run a sweep and a preload as soon as the daemon starts
    #[serde(default = "default_true")]
    pub run_on_startup: bool,

    /// Consecutive failed cycles before the daemon gives up
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    /// TTL per endpoint class
    #[serde(default)]
    pub ttl: TtlPolicy,
}

const fn default_sweep_interval_secs() -> u64 {
    60 * 60
}

const fn default_preload_interval_secs() -> u64 {
    6 * 60 * 60
}

const fn default_true() -> bool {
    true
}

const fn default_max_consecutive_failures() -> u32 {
    5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            preload_interval_secs: default_preload_interval_secs(),
            run_on_startup: default_true(),
            max_consecutive_failures: default_max_consecutive_failures(),
            ttl: TtlPolicy::default(),
        }
    }
}

/// Upstream sports API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpstreamConfig {
    /// Base URL; the endpoint name is appended as a path segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Header carrying the API key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://v3.football.api-sports.io".to_string()
}

fn default_api_key_header() -> String {
    "x-apisports-key".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_header: default_api_key_header(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    500
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Preload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PreloadConfig {
    /// Fixture dates to preload after today (0 = today only)
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,

    /// Also preload the league list
    #[serde(default = "default_true")]
    pub leagues: bool,

    /// Upstream fetches in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

const fn default_days_ahead() -> u32 {
    1
}

const fn default_concurrency() -> usize {
    2
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            days_ahead: default_days_ahead(),
            leagues: default_true(),
            concurrency: default_concurrency(),
        }
    }
}
