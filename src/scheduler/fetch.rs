use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, warn};

use crate::models::QuoteRecord;
use crate::provider::{ProviderError, QuoteProvider};
use crate::store::HistoryStore;

/// Fetch-and-record shared by scheduled ticks, on-start fetches and manual refreshes
///
/// Provider failures stop here: they are logged and reported as `None`.
#[derive(Clone)]
pub struct QuoteFetcher {
    provider: Arc<dyn QuoteProvider>,
    store: Arc<HistoryStore>,
}

impl QuoteFetcher {
    pub fn new(provider: Arc<dyn QuoteProvider>, store: Arc<HistoryStore>) -> Self {
        Self { provider, store }
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    /// Fetch one quote and append it to the symbol's history
    pub async fn fetch_and_record(&self, symbol: &str) -> Option<QuoteRecord> {
        let quote = match self.provider.fetch_quote(symbol).await {
            Ok(quote) => quote,
            Err(ProviderError::MissingCredential) => {
                error!(symbol, "FINNHUB_API_KEY not set in environment");
                return None;
            }
            Err(e) => {
                error!(symbol, error = %e, "Error fetching data");
                return None;
            }
        };

        let record = QuoteRecord::from_provider(symbol, &quote, Utc::now().timestamp_millis());
        match &record.warning {
            Some(warning) => warn!(symbol, warning = %warning, "quote provider returned no usable prices"),
            None => debug!(symbol, current = record.current, "quote recorded"),
        }

        self.store.append(symbol, record.clone());
        Some(record)
    }

    /// Fire-and-forget fetch on a detached task
    ///
    /// The task is not tracked, so cancelling a monitor does not cancel a fetch that
    /// is already in flight.
    pub fn spawn_fetch(&self, symbol: String) {
        let fetcher = self.clone();
        tokio::spawn(async move {
            let _ = fetcher.fetch_and_record(&symbol).await;
        });
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::models::ProviderQuote;
    use crate::provider::{ProviderError, QuoteProvider};

    /// Provider returning a canned outcome and counting calls
    pub struct StubProvider {
        pub calls: AtomicUsize,
        quote: Option<ProviderQuote>,
    }

    impl StubProvider {
        pub fn returning(quote: ProviderQuote) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                quote: Some(quote),
            }
        }

        pub fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                quote: None,
            }
        }

        pub fn priced(current: f64) -> Self {
            Self::returning(ProviderQuote {
                open: Some(current - 1.0),
                high: Some(current + 1.0),
                low: Some(current - 2.0),
                current: Some(current),
                previous_close: Some(current - 0.5),
                timestamp: Some(1_760_601_600),
                ..Default::default()
            })
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for StubProvider {
        async fn fetch_quote(&self, _symbol: &str) -> Result<ProviderQuote, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.quote
                .clone()
                .ok_or_else(|| ProviderError::InvalidResponse("connection reset".to_string()))
        }
    }
}
