//! Per-symbol polling
//!
//! - `monitor`: timer lifecycle (start / stop / refresh / shutdown)
//! - `fetch`: the fetch-and-record path every trigger goes through
//! - `errors`: control operation errors

pub mod errors;
pub mod fetch;
pub mod monitor;

pub use errors::MonitorError;
pub use fetch::QuoteFetcher;
pub use monitor::{resolve_interval, Scheduler, MAX_INTERVAL, MIN_INTERVAL};
