//! Domain layer for sportcache
//!
//! Pure models, error types and the port traits that storage and upstream
//! adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CacheError, CacheResult};
