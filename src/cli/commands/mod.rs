//! CLI command implementations.

pub mod clear;
pub mod get;
pub mod init;
pub mod preload;
pub mod serve;
pub mod set;
pub mod stats;
pub mod sweep;
