// Library Crate Root
// lib.rs

pub mod api;
pub mod config;
pub mod models;
pub mod provider;
pub mod scheduler;
pub mod store;

// pub use = re-export at crate root
pub use api::{create_router, AppState};
pub use config::AppConfig;
pub use models::{MonitorResult, QuoteRecord};
pub use provider::{FinnhubClient, QuoteProvider};
pub use scheduler::Scheduler;
pub use store::HistoryStore;
