//! Cache statistics models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregates for one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub endpoint: String,
    pub entry_count: u64,
    /// Sum of `access_count` over the endpoint's entries.
    pub total_accesses: u64,
    pub avg_accesses: f64,
    /// Most recent hit on any of the endpoint's entries.
    pub last_accessed: Option<DateTime<Utc>>,
}

/// Snapshot of cache contents and request counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_requests: u64,
    pub total_hits: u64,
    pub total_misses: u64,
    /// Fraction in `0.0..=1.0`; `0.0` when no requests were made.
    pub hit_rate: f64,
    pub per_endpoint: Vec<EndpointStats>,
}

impl CacheStats {
    pub fn new(total_entries: u64, total_requests: u64, total_hits: u64, per_endpoint: Vec<EndpointStats>) -> Self {
        Self {
            total_entries,
            total_requests,
            total_hits,
            total_misses: total_requests.saturating_sub(total_hits),
            hit_rate: hit_rate(total_hits, total_requests),
            per_endpoint,
        }
    }

    /// Hit rate as a percentage string, `"0%"` when nothing was requested.
    pub fn hit_rate_display(&self) -> String {
        if self.total_requests == 0 {
            "0%".to_string()
        } else {
            format!("{:.1}%", self.hit_rate * 100.0)
        }
    }
}

/// `hits / requests`, or `0.0` for no requests.
#[allow(clippy::cast_precision_loss)]
pub fn hit_rate(hits: u64, requests: u64) -> f64 {
    if requests == 0 {
        0.0
    } else {
        hits as f64 / requests as f64
    }
}
