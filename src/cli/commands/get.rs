//! Implementation of the `sportcache get` command.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use serde_json::Value;

use crate::cli::output::{output, CommandOutput};
use crate::cli::{build_fetcher, open_cache, params_from, parse_param};
use crate::domain::models::{compute_key, CacheLookup, Config, EntryMetadata};

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Upstream endpoint name, e.g. `fixtures` or `fixtures/headtohead`
    pub endpoint: String,

    /// Request parameter (repeatable)
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, Value)>,

    /// On a miss, fetch from upstream and store the result
    #[arg(long)]
    pub fetch: bool,
}

#[derive(Debug, Serialize)]
pub struct GetOutput {
    pub key: String,
    pub hit: bool,
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EntryMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,
}

impl CommandOutput for GetOutput {
    fn to_human(&self) -> String {
        let Some(data) = &self.data else {
            return format!("Miss: {}", self.key);
        };

        let source = if self.from_cache { "Hit" } else { "Fetched" };
        let mut lines = vec![format!("{source}: {}", self.key)];
        if let Some(meta) = &self.metadata {
            lines.push(format!("  created:  {}", meta.created_at.to_rfc3339()));
            lines.push(format!(
                "  expires:  {}",
                meta.expires_at.map_or_else(|| "never".to_string(), |t| t.to_rfc3339())
            ));
            lines.push(format!("  accesses: {}", meta.access_count));
        } else if let Some(updated) = self.last_update {
            lines.push(format!("  updated:  {}", updated.to_rfc3339()));
        }
        lines.push(serde_json::to_string_pretty(data).unwrap_or_default());
        lines.join("\n")
    }
}

pub async fn execute(args: GetArgs, config: &Config, json_mode: bool) -> Result<()> {
    let params = params_from(args.params);
    let key = compute_key(&args.endpoint, &params);
    let cache = open_cache(config).await?;

    let output_data = if args.fetch {
        let fetcher = build_fetcher(config, cache)?;
        let response = fetcher
            .fetch(&args.endpoint, &params)
            .await
            .with_context(|| format!("Failed to fetch {}", args.endpoint))?;
        GetOutput {
            key,
            hit: response.from_cache,
            from_cache: response.from_cache,
            data: Some(response.data),
            metadata: None,
            last_update: Some(response.last_update),
        }
    } else {
        match cache.get(&args.endpoint, &params).await.context("Cache lookup failed")? {
            CacheLookup::Hit { payload, metadata } => {
                let data = payload
                    .decode::<Value>()
                    .unwrap_or_else(|_| Value::String(payload.into_string()));
                GetOutput {
                    key,
                    hit: true,
                    from_cache: true,
                    data: Some(data),
                    last_update: Some(metadata.created_at),
                    metadata: Some(metadata),
                }
            }
            CacheLookup::Miss => GetOutput {
                key,
                hit: false,
                from_cache: false,
                data: None,
                metadata: None,
                last_update: None,
            },
        }
    };

    output(&output_data, json_mode);
    Ok(())
}
