//! Implementation of the `sportcache set` command.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::cli::output::{output, CommandOutput};
use crate::cli::{open_cache, params_from, parse_param};
use crate::domain::models::{compute_key, Config, EndpointClass, EntryMetadata};

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Upstream endpoint name
    pub endpoint: String,

    /// Response body as JSON
    #[arg(value_name = "VALUE_JSON")]
    pub value: String,

    /// Request parameter (repeatable)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,

    /// Lifetime in seconds; 0 never expires. Defaults to the endpoint's TTL policy.
    #[arg(long, value_name = "SECS")]
    pub ttl: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SetOutput {
    pub key: String,
    pub class: EndpointClass,
    pub ttl_secs: Option<u64>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SetOutput {
    /// Describe the row as it was written.
    pub fn new(key: String, class: EndpointClass, stored: &EntryMetadata) -> Self {
        Self {
            key,
            class,
            ttl_secs: stored
                .expires_at
                .map(|at| (at - stored.created_at).num_seconds().unsigned_abs()),
            expires_at: stored.expires_at,
        }
    }
}

impl CommandOutput for SetOutput {
    fn to_human(&self) -> String {
        match self.expires_at {
            Some(at) => format!("Stored {} ({}), expires {}", self.key, self.class, at.to_rfc3339()),
            None => format!("Stored {} ({}), never expires", self.key, self.class),
        }
    }
}

pub async fn execute(args: SetArgs, config: &Config, json_mode: bool) -> Result<()> {
    let value: Value = serde_json::from_str(&args.value).context("VALUE_JSON is not valid JSON")?;
    let params = params_from(args.params);
    let class = EndpointClass::classify(&args.endpoint, &params);
    let ttl = match args.ttl {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.cache.ttl.ttl_for(class),
    };

    let cache = open_cache(config).await?;
    let stored = cache
        .set(&args.endpoint, &params, &value, ttl)
        .await
        .with_context(|| format!("Failed to store {}", args.endpoint))?;

    let output_data = SetOutput::new(compute_key(&args.endpoint, &params), class, &stored);
    output(&output_data, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_output() {
        let out = SetOutput {
            key: "leagues:{}".to_string(),
            class: EndpointClass::Leagues,
            ttl_secs: None,
            expires_at: None,
        };
        assert_eq!(out.to_human(), "Stored leagues:{} (leagues), never expires");
    }

    #[test]
    fn test_output_reports_stored_expiry() {
        let created_at = Utc::now();
        let stored = EntryMetadata {
            created_at,
            expires_at: Some(created_at + chrono::Duration::seconds(300)),
            access_count: 0,
            last_accessed_at: None,
        };
        let out = SetOutput::new("odds:{}".to_string(), EndpointClass::Odds, &stored);
        assert_eq!(out.expires_at, stored.expires_at);
        assert_eq!(out.ttl_secs, Some(300));
    }
}
