//! Infrastructure layer
//!
//! Process-wide concerns that sit outside the cache itself:
//! - Configuration loading and validation
//! - Logging setup

pub mod config;
pub mod logging;
