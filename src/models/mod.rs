pub mod monitor;
pub mod quote;

pub use monitor::{MonitorInfo, MonitorResult, StartMonitoringRequest, SymbolQuery, SymbolRequest};
pub use quote::{ProviderQuote, QuoteRecord, EMPTY_DATA_WARNING};
