//! Implementation of the `sportcache stats` command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets, Attribute, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::cli::open_cache;
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::models::{CacheStats, Config, EndpointStats};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Only show endpoints starting with this prefix
    #[arg(long, value_name = "PREFIX")]
    pub endpoint_prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsOutput {
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate_display: String,
}

impl CommandOutput for StatsOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Entries:  {}", self.stats.total_entries),
            format!(
                "Requests: {} ({} hits, {} misses, hit rate {})",
                self.stats.total_requests, self.stats.total_hits, self.stats.total_misses, self.hit_rate_display
            ),
        ];

        if self.stats.per_endpoint.is_empty() {
            lines.push("\nNo cached endpoints.".to_string());
        } else {
            lines.push(String::new());
            lines.push(format_endpoint_table(&self.stats.per_endpoint));
        }
        lines.join("\n")
    }
}

/// Render per-endpoint aggregates as a table.
pub fn format_endpoint_table(rows: &[EndpointStats]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Endpoint").add_attribute(Attribute::Bold),
            Cell::new("Entries").add_attribute(Attribute::Bold),
            Cell::new("Accesses").add_attribute(Attribute::Bold),
            Cell::new("Avg").add_attribute(Attribute::Bold),
            Cell::new("Last accessed").add_attribute(Attribute::Bold),
        ]);

    for row in rows {
        let last = row
            .last_accessed
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string());
        table.add_row(vec![
            Cell::new(truncate(&row.endpoint, 40)),
            Cell::new(row.entry_count).set_alignment(CellAlignment::Right),
            Cell::new(row.total_accesses).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}", row.avg_accesses)).set_alignment(CellAlignment::Right),
            Cell::new(last),
        ]);
    }

    table.to_string()
}

pub async fn execute(args: StatsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let cache = open_cache(config).await?;
    let mut stats = cache.stats().await.context("Failed to read cache statistics")?;

    if let Some(prefix) = args.endpoint_prefix.as_deref() {
        stats.per_endpoint.retain(|row| row.endpoint.starts_with(prefix));
    }

    let output_data = StatsOutput {
        hit_rate_display: stats.hit_rate_display(),
        stats,
    };
    output(&output_data, json_mode);
    Ok(())
}
