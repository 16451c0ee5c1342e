//! Implementation of the `sportcache sweep` command.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::open_cache;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct SweepOutput {
    pub deleted: u64,
    pub remaining: u64,
}

impl CommandOutput for SweepOutput {
    fn to_human(&self) -> String {
        format!(
            "Removed {} expired entr{} ({} remaining)",
            self.deleted,
            if self.deleted == 1 { "y" } else { "ies" },
            self.remaining
        )
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let cache = open_cache(config).await?;
    let deleted = cache.sweep_expired().await.context("Failed to sweep expired entries")?;
    let remaining = cache.stats().await.context("Failed to count entries")?.total_entries;

    output(&SweepOutput { deleted, remaining }, json_mode);
    Ok(())
}
