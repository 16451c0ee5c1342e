//! Sportcache - request cache for a football betting dashboard
//!
//! Responses from a third-party football API (fixtures, odds, predictions,
//! leagues, teams, head-to-head) are stored in a single `SQLite` table, keyed
//! by endpoint plus canonical request parameters, with per-endpoint TTLs and
//! hit/miss accounting.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the `CacheStore` / `UpstreamFetcher` ports
//! - **Adapters** (`adapters`): `SQLite` storage and the HTTP upstream client
//! - **Service Layer** (`services`): the request cache, read-through fetching, preload and maintenance
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): administrative command-line interface
//!
//! # Example
//!
//! ```ignore
//! use sportcache::adapters::sqlite::{initialize_database, SqliteCacheStore};
//! use sportcache::{RequestCache, RequestParams};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = initialize_database("sqlite:.sportcache/cache.db", None).await?;
//!     let cache = RequestCache::new(SqliteCacheStore::new(pool));
//!     let params = RequestParams::new().with("date", "2024-01-01");
//!     let lookup = cache.get("fixtures", &params).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{CacheError, CacheResult};
pub use domain::models::{
    compute_key, CacheEntry, CacheLookup, CacheStats, CachedPayload, Config, EndpointClass,
    EndpointStats, EntryMetadata, InvalidationMatcher, RequestParams, TtlPolicy,
};
pub use domain::ports::{CacheStore, UpstreamError, UpstreamFetcher};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CachedFetcher, CachedResponse, FetchError, RequestCache};
