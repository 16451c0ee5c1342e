//! Domain models for the request cache.

pub mod cache_entry;
pub mod config;
pub mod invalidation;
pub mod request_key;
pub mod stats;
pub mod ttl_policy;

pub use cache_entry::{expiry_for, CacheEntry, CacheLookup, CachedPayload, EntryMetadata};
pub use config::{
    CacheConfig, Config, DatabaseConfig, LoggingConfig, PreloadConfig, RetryConfig, UpstreamConfig,
};
pub use invalidation::InvalidationMatcher;
pub use request_key::{compute_key, RequestParams, KEY_SEPARATOR};
pub use stats::{hit_rate, CacheStats, EndpointStats};
pub use ttl_policy::{EndpointClass, TtlPolicy};
