//! Implementation of the `sportcache serve` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cli::output::{output, CommandOutput};
use crate::cli::{build_fetcher, open_cache};
use crate::domain::models::Config;
use crate::services::{MaintenanceConfig, MaintenanceDaemon, MaintenanceEvent, PreloadService, StopReason};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Only sweep; never call the upstream API
    #[arg(long)]
    pub no_preload: bool,
}

#[derive(Debug, Serialize)]
pub struct ServeOutput {
    pub stop_reason: String,
    pub sweep_runs: u64,
    pub failed_sweeps: u64,
    pub preload_runs: u64,
    pub total_swept: u64,
    pub total_preloaded: u64,
}

impl CommandOutput for ServeOutput {
    fn to_human(&self) -> String {
        format!(
            "Stopped ({}): {} sweep(s) removed {} entr{}, {} preload(s) stored {}",
            self.stop_reason,
            self.sweep_runs,
            self.total_swept,
            if self.total_swept == 1 { "y" } else { "ies" },
            self.preload_runs,
            self.total_preloaded
        )
    }
}

pub async fn execute(args: ServeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let cache = open_cache(config).await?;
    let mut daemon = MaintenanceDaemon::new(cache.clone(), MaintenanceConfig::from(&config.cache));

    if !args.no_preload {
        let fetcher = build_fetcher(config, cache)?;
        daemon = daemon.with_preload(Arc::new(PreloadService::new(Arc::new(fetcher), config.preload.clone())));
    }

    let handle = daemon.handle();
    let mut events = daemon.run();

    let shutdown = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping maintenance daemon");
        } else {
            warn!("failed to listen for interrupt, stopping maintenance daemon");
        }
        shutdown.stop();
    });

    let mut reason = StopReason::Requested;
    while let Some(event) = events.recv().await {
        match event {
            MaintenanceEvent::Started => info!("serving; press Ctrl-C to stop"),
            MaintenanceEvent::SweepCompleted { run_number, deleted, duration_ms } => {
                info!(run_number, deleted, duration_ms, "sweep completed");
            }
            MaintenanceEvent::SweepFailed { run_number, error } => warn!(run_number, %error, "sweep failed"),
            MaintenanceEvent::PreloadCompleted { run_number, report } => info!(
                run_number,
                stored = report.stored,
                failed = report.failures.len(),
                "preload completed"
            ),
            MaintenanceEvent::Stopped { reason: stopped } => {
                reason = stopped;
                break;
            }
        }
    }

    let status = handle.status().await;
    output(
        &ServeOutput {
            stop_reason: format!("{reason:?}").to_lowercase(),
            sweep_runs: status.sweep_runs,
            failed_sweeps: status.failed_sweeps,
            preload_runs: status.preload_runs,
            total_swept: status.total_swept,
            total_preloaded: status.total_preloaded,
        },
        json_mode,
    );

    match reason {
        StopReason::Requested => Ok(()),
        StopReason::TooManyFailures => Err(anyhow::anyhow!("maintenance daemon stopped after repeated sweep failures"))
            .context("Cache database is unavailable"),
    }
}
