use dashmap::DashMap;

use crate::models::{MonitorResult, QuoteRecord};

/// In-memory quote history, keyed by symbol
///
/// Each symbol holds an append-only sequence in insertion (chronological) order.
/// Mutations for one symbol are serialized by the map's shard lock, so concurrent
/// fetches for different symbols never block each other on the same key.
/// There is no size cap; a sequence only shrinks through [`HistoryStore::delete_all`].
#[derive(Debug, Default)]
pub struct HistoryStore {
    histories: DashMap<String, Vec<QuoteRecord>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, creating the symbol's sequence on first use
    pub fn append(&self, symbol: &str, record: QuoteRecord) {
        self.histories
            .entry(symbol.to_string())
            .or_default()
            .push(record);
    }

    /// Snapshot of a symbol's history; empty if the symbol was never observed
    pub fn get(&self, symbol: &str) -> Vec<QuoteRecord> {
        self.histories
            .get(symbol)
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Most recent record for a symbol
    pub fn latest(&self, symbol: &str) -> Option<QuoteRecord> {
        self.histories
            .get(symbol)
            .and_then(|records| records.last().cloned())
    }

    /// Number of records held for a symbol
    pub fn len(&self, symbol: &str) -> usize {
        self.histories.get(symbol).map(|r| r.len()).unwrap_or(0)
    }

    /// Drop every record for a symbol
    ///
    /// Absent history is a negative result, not an error.
    pub fn delete_all(&self, symbol: &str) -> MonitorResult {
        match self.histories.remove(symbol) {
            Some((_, records)) => {
                tracing::info!(symbol, removed = records.len(), "history deleted");
                MonitorResult::ok(format!("Deleted history for {}", symbol))
            }
            None => MonitorResult::negative(format!("No history for {}", symbol)),
        }
    }
}
