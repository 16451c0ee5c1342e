//! Administrative command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::adapters::http::UpstreamClient;
use crate::adapters::sqlite::{initialize_from_config, SqliteCacheStore};
use crate::domain::models::{Config, RequestParams};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{CachedFetcher, RequestCache};

pub type SqliteFetcher = CachedFetcher<SqliteCacheStore, UpstreamClient>;

/// Load configuration from an explicit file or the project defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Open (and migrate) the configured database and wrap it in a cache.
pub async fn open_cache(config: &Config) -> Result<RequestCache<SqliteCacheStore>> {
    let pool = initialize_from_config(&config.database)
        .await
        .with_context(|| format!("Failed to open cache database at {}", config.database.path))?;
    Ok(RequestCache::new(SqliteCacheStore::new(pool)))
}

/// Read-through fetcher over `cache` using the configured upstream.
pub fn build_fetcher(config: &Config, cache: RequestCache<SqliteCacheStore>) -> Result<SqliteFetcher> {
    if config.upstream.api_key.as_deref().unwrap_or_default().is_empty() {
        tracing::warn!("no upstream api_key configured; requests will be sent unauthenticated");
    }
    let client = UpstreamClient::new(&config.upstream, &config.retry).context("Failed to build upstream client")?;
    Ok(CachedFetcher::new(cache, Arc::new(client), config.cache.ttl.clone()))
}

/// Parse a `KEY=VALUE` request parameter.
///
/// Values that parse as JSON (numbers, booleans, quoted strings, objects) keep
/// their JSON type; anything else is taken as a plain string, so
/// `league=39` is the number 39 and `date=2024-01-01` is a string.
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid parameter '{raw}': expected KEY=VALUE"))?;
    if name.is_empty() {
        return Err(format!("invalid parameter '{raw}': empty name"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

pub fn params_from(pairs: Vec<(String, Value)>) -> RequestParams {
    pairs.into_iter().collect()
}

/// Report a command failure and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}
