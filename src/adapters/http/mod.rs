//! HTTP adapters for upstream sports data.

pub mod upstream_client;

pub use upstream_client::UpstreamClient;
