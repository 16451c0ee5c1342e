//! Port trait definitions (Hexagonal Architecture)
//!
//! - CacheStore: persistence of cache entries
//! - UpstreamFetcher: the third-party sports API
//!
//! Adapters in `crate::adapters` implement these so the cache service stays
//! independent of SQLite and HTTP specifics.

pub mod cache_store;
pub mod upstream;

pub use cache_store::CacheStore;
pub use upstream::{UpstreamError, UpstreamFetcher};
