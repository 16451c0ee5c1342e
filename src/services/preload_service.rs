//! Cache warm-up.
//!
//! Fetches the data the dashboard opens with (fixtures for today and the next
//! few days, the league list) and stores it so the first page load is a hit.

use chrono::{Days, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::domain::models::{PreloadConfig, RequestParams};
use crate::domain::ports::{CacheStore, UpstreamFetcher};
use crate::services::read_through::CachedFetcher;

/// One upstream request to warm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreloadJob {
    pub endpoint: String,
    pub params: RequestParams,
}

impl PreloadJob {
    pub fn new(endpoint: impl Into<String>, params: RequestParams) -> Self {
        Self {
            endpoint: endpoint.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreloadFailure {
    pub job: PreloadJob,
    pub error: String,
}

/// Outcome of a preload run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreloadReport {
    pub attempted: usize,
    pub stored: usize,
    pub failures: Vec<PreloadFailure>,
    pub duration_ms: u64,
}

impl PreloadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct PreloadService<S: CacheStore, U: UpstreamFetcher> {
    fetcher: Arc<CachedFetcher<S, U>>,
    config: PreloadConfig,
}

impl<S: CacheStore, U: UpstreamFetcher> PreloadService<S, U> {
    pub fn new(fetcher: Arc<CachedFetcher<S, U>>, config: PreloadConfig) -> Self {
        Self { fetcher, config }
    }

    /// Jobs for a preload starting on `today`.
    pub fn jobs_for(&self, today: NaiveDate) -> Vec<PreloadJob> {
        let mut jobs: Vec<PreloadJob> = (0..=u64::from(self.config.days_ahead))
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .map(|date| {
                PreloadJob::new(
                    "fixtures",
                    RequestParams::new().with("date", date.format("%Y-%m-%d").to_string()),
                )
            })
            .collect();

        if self.config.leagues {
            jobs.push(PreloadJob::new("leagues", RequestParams::new()));
        }
        jobs
    }

    /// Preload the default job set for the current UTC date.
    pub async fn run(&self) -> PreloadReport {
        self.run_jobs(self.jobs_for(Utc::now().date_naive())).await
    }

    /// Refresh every job, at most `concurrency` at a time.
    ///
    /// A failed job is recorded in the report and does not stop the others.
    pub async fn run_jobs(&self, jobs: Vec<PreloadJob>) -> PreloadReport {
        let start = Instant::now();
        let attempted = jobs.len();
        let concurrency = self.config.concurrency.max(1);

        let results: Vec<(PreloadJob, Result<(), String>)> = stream::iter(jobs)
            .map(|job| async move {
                let result = self
                    .fetcher
                    .refresh(&job.endpoint, &job.params)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.to_string());
                (job, result)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut report = PreloadReport {
            attempted,
            ..PreloadReport::default()
        };
        for (job, result) in results {
            match result {
                Ok(()) => report.stored += 1,
                Err(error) => {
                    warn!(endpoint = %job.endpoint, params = %job.params, %error, "preload job failed");
                    report.failures.push(PreloadFailure { job, error });
                }
            }
        }
        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            attempted = report.attempted,
            stored = report.stored,
            failed = report.failures.len(),
            duration_ms = report.duration_ms,
            "preload finished"
        );
        report
    }
}
