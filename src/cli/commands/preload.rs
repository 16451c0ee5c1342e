//! Implementation of the `sportcache preload` command.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use crate::cli::output::{output, CommandOutput};
use crate::cli::{build_fetcher, open_cache};
use crate::domain::models::Config;
use crate::services::{PreloadReport, PreloadService};

#[derive(Args, Debug)]
pub struct PreloadArgs {
    /// Fixture dates after today to preload (overrides config)
    #[arg(long, value_name = "DAYS")]
    pub days_ahead: Option<u32>,

    /// Skip the league list
    #[arg(long)]
    pub no_leagues: bool,
}

impl CommandOutput for PreloadReport {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Preloaded {}/{} request(s) in {} ms",
            self.stored, self.attempted, self.duration_ms
        )];
        for failure in &self.failures {
            lines.push(format!(
                "  failed {} {}: {}",
                failure.job.endpoint, failure.job.params, failure.error
            ));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: PreloadArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut preload_config = config.preload.clone();
    if let Some(days) = args.days_ahead {
        preload_config.days_ahead = days;
    }
    if args.no_leagues {
        preload_config.leagues = false;
    }

    let cache = open_cache(config).await?;
    let fetcher = build_fetcher(config, cache)?;
    let report = PreloadService::new(Arc::new(fetcher), preload_config).run().await;

    output(&report, json_mode);
    if report.is_clean() {
        Ok(())
    } else {
        anyhow::bail!("{} of {} preload request(s) failed", report.failures.len(), report.attempted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RequestParams;
    use crate::services::preload_service::{PreloadFailure, PreloadJob};

    #[test]
    fn test_report_lists_failures() {
        let report = PreloadReport {
            attempted: 2,
            stored: 1,
            failures: vec![PreloadFailure {
                job: PreloadJob::new("leagues", RequestParams::new()),
                error: "Upstream fetch failed: HTTP 500".to_string(),
            }],
            duration_ms: 12,
        };
        let text = report.to_human();
        assert!(text.starts_with("Preloaded 1/2 request(s) in 12 ms"));
        assert!(text.contains("failed leagues {}"));
    }
}
