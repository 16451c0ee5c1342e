pub mod maintenance_daemon;
pub mod preload_service;
pub mod read_through;
pub mod request_cache;

pub use maintenance_daemon::{DaemonHandle, MaintenanceConfig, MaintenanceDaemon, MaintenanceEvent, StopReason};
pub use preload_service::{PreloadJob, PreloadReport, PreloadService};
pub use read_through::{CachedFetcher, CachedResponse, FetchError};
pub use request_cache::{CacheCounters, RequestCache};
