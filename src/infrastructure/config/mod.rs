//! Configuration management
//!
//! Hierarchical configuration using figment:
//! - defaults, then `.sportcache/config.yaml`, then `.sportcache/local.yaml`
//! - `SPORTCACHE_*` environment overrides
//! - validation after merging

pub mod loader;

pub use loader::{ConfigError, ConfigLoader, CONFIG_DIR, ENV_PREFIX};
