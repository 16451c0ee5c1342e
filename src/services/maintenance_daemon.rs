//! Cache maintenance background daemon.
//!
//! Runs the scheduled cache chores:
//! - sweeping expired entries (hourly by default)
//! - preloading fixtures and leagues (every six hours by default)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify, RwLock};
use tokio::time::{interval, interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::domain::errors::CacheResult;
use crate::domain::models::CacheConfig;
use crate::domain::ports::{CacheStore, UpstreamFetcher};
use crate::services::preload_service::{PreloadReport, PreloadService};
use crate::services::request_cache::RequestCache;

/// Configuration for the maintenance daemon.
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Interval between expiry sweeps.
    pub sweep_interval: Duration,
    /// Interval between preload runs.
    pub preload_interval: Duration,
    /// Whether to sweep and preload immediately on start.
    pub run_on_startup: bool,
    /// Consecutive failed sweeps before stopping. Successful sweeps never
    /// count toward it, so 0 only stops after a failure.
    pub max_consecutive_failures: u32,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(60 * 60),
            preload_interval: Duration::from_secs(6 * 60 * 60),
            run_on_startup: true,
            max_consecutive_failures: 5,
        }
    }
}

impl From<&CacheConfig> for MaintenanceConfig {
    fn from(config: &CacheConfig) -> Self {
        Self {
            sweep_interval: Duration::from_secs(config.sweep_interval_secs),
            preload_interval: Duration::from_secs(config.preload_interval_secs),
            run_on_startup: config.run_on_startup,
            max_consecutive_failures: config.max_consecutive_failures,
        }
    }
}

/// Event emitted by the maintenance daemon.
#[derive(Debug, Clone)]
pub enum MaintenanceEvent {
    Started,
    SweepCompleted {
        run_number: u64,
        deleted: u64,
        duration_ms: u64,
    },
    SweepFailed {
        run_number: u64,
        error: String,
    },
    PreloadCompleted {
        run_number: u64,
        report: PreloadReport,
    },
    Stopped {
        reason: StopReason,
    },
}

/// Reason the daemon stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Requested to stop.
    Requested,
    /// Too many consecutive sweep failures.
    TooManyFailures,
}

/// Status of the maintenance daemon.
#[derive(Debug, Clone, Default)]
pub struct DaemonStatus {
    pub running: bool,
    pub sweep_runs: u64,
    pub failed_sweeps: u64,
    pub preload_runs: u64,
    /// Entries removed across all sweeps.
    pub total_swept: u64,
    /// Entries stored across all preloads.
    pub total_preloaded: u64,
    pub last_sweep: Option<Instant>,
    pub last_preload: Option<Instant>,
}

/// Handle to control the maintenance daemon.
#[derive(Clone)]
pub struct DaemonHandle {
    stop_flag: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
    status: Arc<RwLock<DaemonStatus>>,
}

impl DaemonHandle {
    /// Request the daemon to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.stop_signal.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> DaemonStatus {
        self.status.read().await.clone()
    }
}

/// Cache maintenance background daemon.
///
/// Preloading is optional; without an upstream only sweeps run.
pub struct MaintenanceDaemon<S, U>
where
    S: CacheStore + 'static,
    U: UpstreamFetcher + 'static,
{
    cache: RequestCache<S>,
    preload: Option<Arc<PreloadService<S, U>>>,
    config: MaintenanceConfig,
    status: Arc<RwLock<DaemonStatus>>,
    stop_flag: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
}

impl<S, U> MaintenanceDaemon<S, U>
where
    S: CacheStore + 'static,
    U: UpstreamFetcher + 'static,
{
    pub fn new(cache: RequestCache<S>, config: MaintenanceConfig) -> Self {
        Self {
            cache,
            preload: None,
            config,
            status: Arc::new(RwLock::new(DaemonStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            stop_signal: Arc::new(Notify::new()),
        }
    }

    pub fn with_preload(mut self, preload: Arc<PreloadService<S, U>>) -> Self {
        self.preload = Some(preload);
        self
    }

    /// Get a handle to control the daemon.
    pub fn handle(&self) -> DaemonHandle {
        DaemonHandle {
            stop_flag: self.stop_flag.clone(),
            stop_signal: self.stop_signal.clone(),
            status: self.status.clone(),
        }
    }

    /// Run the daemon on a background task, returning a channel for events.
    pub fn run(self) -> mpsc::Receiver<MaintenanceEvent> {
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            self.run_loop(tx).await;
        });

        rx
    }

    fn timer(&self, period: Duration) -> Interval {
        let mut timer = if self.config.run_on_startup {
            interval(period)
        } else {
            interval_at(Instant::now() + period, period)
        };
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer
    }

    async fn run_loop(self, tx: mpsc::Sender<MaintenanceEvent>) {
        self.status.write().await.running = true;
        let _ = tx.send(MaintenanceEvent::Started).await;
        info!(
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            preload_interval_secs = self.config.preload_interval.as_secs(),
            preload_enabled = self.preload.is_some(),
            "maintenance daemon started"
        );

        let mut consecutive_failures = 0u32;
        let mut sweep_timer = self.timer(self.config.sweep_interval);
        let mut preload_timer = self.timer(self.config.preload_interval);

        let reason = loop {
            if self.stop_flag.load(Ordering::Acquire) {
                break StopReason::Requested;
            }

            tokio::select! {
                () = self.stop_signal.notified() => break StopReason::Requested,
                _ = sweep_timer.tick() => {
                    self.run_sweep_cycle(&tx, &mut consecutive_failures).await;
                    if consecutive_failures > 0
                        && consecutive_failures >= self.config.max_consecutive_failures
                    {
                        break StopReason::TooManyFailures;
                    }
                }
                _ = preload_timer.tick(), if self.preload.is_some() => {
                    self.run_preload_cycle(&tx).await;
                }
            }
        };

        self.status.write().await.running = false;
        info!(?reason, "maintenance daemon stopped");
        let _ = tx.send(MaintenanceEvent::Stopped { reason }).await;
    }

    async fn run_sweep_cycle(&self, tx: &mpsc::Sender<MaintenanceEvent>, consecutive_failures: &mut u32) {
        let run_number = {
            let mut status = self.status.write().await;
            status.sweep_runs += 1;
            status.sweep_runs
        };

        let start = Instant::now();
        let result = self.cache.sweep_expired().await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(deleted) => {
                *consecutive_failures = 0;
                {
                    let mut status = self.status.write().await;
                    status.total_swept += deleted;
                    status.last_sweep = Some(Instant::now());
                }
                let _ = tx
                    .send(MaintenanceEvent::SweepCompleted {
                        run_number,
                        deleted,
                        duration_ms,
                    })
                    .await;
            }
            Err(e) => {
                *consecutive_failures += 1;
                warn!(run_number, consecutive_failures = *consecutive_failures, error = %e, "sweep failed");
                self.status.write().await.failed_sweeps += 1;
                let _ = tx
                    .send(MaintenanceEvent::SweepFailed {
                        run_number,
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    }

    async fn run_preload_cycle(&self, tx: &mpsc::Sender<MaintenanceEvent>) {
        let Some(preload) = &self.preload else {
            return;
        };

        let report = preload.run().await;
        let run_number = {
            let mut status = self.status.write().await;
            status.preload_runs += 1;
            status.total_preloaded += report.stored as u64;
            status.last_preload = Some(Instant::now());
            status.preload_runs
        };
        let _ = tx.send(MaintenanceEvent::PreloadCompleted { run_number, report }).await;
    }

    /// Sweep once (for manual invocation).
    pub async fn sweep_once(&self) -> CacheResult<u64> {
        self.cache.sweep_expired().await
    }

    /// Preload once, if an upstream is configured.
    pub async fn preload_once(&self) -> Option<PreloadReport> {
        match &self.preload {
            Some(preload) => Some(preload.run().await),
            None => None,
        }
    }

    pub async fn status(&self) -> DaemonStatus {
        self.status.read().await.clone()
    }

    pub fn config(&self) -> &MaintenanceConfig {
        &self.config
    }
}
