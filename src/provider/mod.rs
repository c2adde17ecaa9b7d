//! Quote provider seam
//!
//! The scheduler only needs "give me the current quote for this symbol"; the
//! Finnhub HTTP client is the production implementation.

pub mod client;
pub mod errors;

pub use client::FinnhubClient;
pub use errors::ProviderError;

use async_trait::async_trait;

use crate::models::ProviderQuote;

/// Source of current quotes for a symbol
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError>;
}
