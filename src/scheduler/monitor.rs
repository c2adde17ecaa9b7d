use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::models::{MonitorInfo, MonitorResult, QuoteRecord};
use crate::provider::QuoteProvider;
use crate::store::HistoryStore;

use super::errors::MonitorError;
use super::fetch::QuoteFetcher;

/// Shortest allowed polling interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Longest allowed polling interval
pub const MAX_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// A running per-symbol timer
struct ActiveMonitor {
    interval: Duration,
    started_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

/// Per-symbol polling scheduler
///
/// Holds at most one timer per symbol. Every tick spawns its own fetch task, so
/// ticks are never delayed by a slow provider and fetches for the same symbol may
/// overlap. Monitoring and history are independent: stopping keeps the history,
/// deleting history keeps the monitor.
pub struct Scheduler {
    fetcher: QuoteFetcher,
    monitors: Mutex<HashMap<String, ActiveMonitor>>,
}

impl Scheduler {
    pub fn new(provider: Arc<dyn QuoteProvider>, store: Arc<HistoryStore>) -> Self {
        Self {
            fetcher: QuoteFetcher::new(provider, store),
            monitors: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<HistoryStore> {
        self.fetcher.store()
    }

    /// Start (or restart) polling `symbol`
    ///
    /// Replaces any existing timer for the symbol, fires one fetch immediately and
    /// then one per interval. Must be called from within a tokio runtime.
    pub fn start(
        &self,
        symbol: &str,
        minutes: f64,
        seconds: f64,
    ) -> Result<MonitorResult, MonitorError> {
        if symbol.trim().is_empty() {
            return Err(MonitorError::InvalidInput("symbol is required".to_string()));
        }
        let interval = resolve_interval(minutes, seconds)?;
        let interval_ms = interval.as_millis() as u64;

        let mut monitors = self.monitors.lock();
        if let Some(previous) = monitors.remove(symbol) {
            previous.handle.abort();
            info!(symbol, previous_ms = previous.interval.as_millis() as u64, "replacing existing monitor");
        }

        self.fetcher.spawn_fetch(symbol.to_string());

        let handle = spawn_ticker(self.fetcher.clone(), symbol.to_string(), interval);
        monitors.insert(
            symbol.to_string(),
            ActiveMonitor {
                interval,
                started_at: Utc::now(),
                handle,
            },
        );
        drop(monitors);

        info!(symbol, interval_ms, "Monitoring {} every {}ms", symbol, interval_ms);
        Ok(MonitorResult::ok(format!("Started monitoring {}", symbol)).with_interval(interval_ms))
    }

    /// Cancel the timer for `symbol`
    ///
    /// A fetch already in flight still completes and records its result.
    pub fn stop(&self, symbol: &str) -> MonitorResult {
        match self.monitors.lock().remove(symbol) {
            Some(monitor) => {
                monitor.handle.abort();
                info!(symbol, "stopped monitoring");
                MonitorResult::ok(format!("Stopped monitoring {}", symbol))
            }
            None => MonitorResult::negative(format!("No active monitor for {}", symbol)),
        }
    }

    /// Fetch and record one quote now, waiting for the outcome
    pub async fn refresh_now(&self, symbol: &str) -> Option<QuoteRecord> {
        self.fetcher.fetch_and_record(symbol).await
    }

    pub fn is_monitoring(&self, symbol: &str) -> bool {
        self.monitors.lock().contains_key(symbol)
    }

    pub fn active_count(&self) -> usize {
        self.monitors.lock().len()
    }

    #[cfg(test)]
    fn interval_of(&self, symbol: &str) -> Option<Duration> {
        self.monitors.lock().get(symbol).map(|m| m.interval)
    }

    /// Active monitors, sorted by symbol
    pub fn monitors(&self) -> Vec<MonitorInfo> {
        let mut infos: Vec<MonitorInfo> = self
            .monitors
            .lock()
            .iter()
            .map(|(symbol, monitor)| MonitorInfo {
                symbol: symbol.clone(),
                interval_ms: monitor.interval.as_millis() as u64,
                started_at: monitor.started_at.to_rfc3339(),
                records: 0,
            })
            .collect();

        // Counted after releasing the monitor lock
        for info in &mut infos {
            info.records = self.store().len(&info.symbol);
        }
        infos.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        infos
    }

    /// Cancel every active timer, returning how many were running
    pub fn shutdown(&self) -> usize {
        let drained: Vec<(String, ActiveMonitor)> = self.monitors.lock().drain().collect();
        for (symbol, monitor) in &drained {
            monitor.handle.abort();
            debug!(symbol = %symbol, "monitor cancelled on shutdown");
        }
        drained.len()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for (_, monitor) in self.monitors.get_mut().drain() {
            monitor.handle.abort();
        }
    }
}

/// Resolve `minutes`/`seconds` into a polling interval
///
/// Negative or non-finite components are rejected. The result is floored at
/// [`MIN_INTERVAL`] and capped at [`MAX_INTERVAL`].
pub fn resolve_interval(minutes: f64, seconds: f64) -> Result<Duration, MonitorError> {
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(MonitorError::InvalidInput(
            "minutes must be a non-negative number".to_string(),
        ));
    }
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(MonitorError::InvalidInput(
            "seconds must be a non-negative number".to_string(),
        ));
    }

    let total_ms = (minutes * 60.0 + seconds) * 1000.0;
    let millis = total_ms
        .max(MIN_INTERVAL.as_millis() as f64)
        .min(MAX_INTERVAL.as_millis() as f64);

    Ok(Duration::from_millis(millis as u64))
}

fn spawn_ticker(fetcher: QuoteFetcher, symbol: String, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        // The on-start fetch covers t=0, so the first tick lands one period later
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            debug!(symbol = %symbol, "Monitoring {}...", symbol);
            fetcher.spawn_fetch(symbol.clone());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::fetch::test_support::StubProvider;

    fn scheduler_with(provider: Arc<StubProvider>) -> Scheduler {
        Scheduler::new(provider, Arc::new(HistoryStore::new()))
    }

    #[test]
    fn test_interval_floor() {
        assert_eq!(resolve_interval(0.0, 0.0).unwrap(), MIN_INTERVAL);
        assert_eq!(resolve_interval(0.0, 0.25).unwrap(), MIN_INTERVAL);
        assert_eq!(resolve_interval(0.0, 1.0).unwrap(), Duration::from_millis(1000));
        assert_eq!(resolve_interval(1.0, 30.0).unwrap(), Duration::from_millis(90_000));
    }

    #[test]
    fn test_interval_rejects_bad_components() {
        assert!(matches!(resolve_interval(-1.0, 0.0), Err(MonitorError::InvalidInput(_))));
        assert!(matches!(resolve_interval(0.0, -5.0), Err(MonitorError::InvalidInput(_))));
        assert!(matches!(resolve_interval(f64::INFINITY, 0.0), Err(MonitorError::InvalidInput(_))));
        assert_eq!(resolve_interval(1e12, 0.0).unwrap(), MAX_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_floors_interval() {
        let scheduler = scheduler_with(Arc::new(StubProvider::priced(10.0)));

        let result = scheduler.start("AAPL", 0.0, 0.0).unwrap();
        assert!(result.success);
        assert_eq!(result.interval_ms, Some(1000));
        assert_eq!(scheduler.interval_of("AAPL"), Some(MIN_INTERVAL));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_rejects_invalid_input() {
        let provider = Arc::new(StubProvider::priced(10.0));
        let scheduler = scheduler_with(provider.clone());

        assert!(scheduler.start("", 1.0, 0.0).is_err());
        assert!(scheduler.start("AAPL", -1.0, 0.0).is_err());
        assert_eq!(scheduler.active_count(), 0);

        tokio::task::yield_now().await;
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_fetch_then_one_per_interval() {
        let provider = Arc::new(StubProvider::priced(10.0));
        let scheduler = scheduler_with(provider.clone());

        let result = scheduler.start("AAPL", 0.0, 1.0).unwrap();
        assert_eq!(result.interval_ms, Some(1000));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(scheduler.store().len("AAPL"), 1);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(scheduler.store().len("AAPL"), 2);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(scheduler.store().len("AAPL"), 3);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_timer() {
        let provider = Arc::new(StubProvider::priced(10.0));
        let scheduler = scheduler_with(provider.clone());

        scheduler.start("AAPL", 0.0, 1.0).unwrap();
        scheduler.start("AAPL", 0.0, 1.0).unwrap();
        assert_eq!(scheduler.active_count(), 1);

        // two on-start fetches, then a single timer ticking
        tokio::time::sleep(Duration::from_millis(1050)).await;
        assert_eq!(scheduler.store().len("AAPL"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_timer_and_keeps_history() {
        let provider = Arc::new(StubProvider::priced(10.0));
        let scheduler = scheduler_with(provider.clone());

        scheduler.start("AAPL", 0.0, 1.0).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let result = scheduler.stop("AAPL");
        assert!(result.success);
        assert_eq!(result.message, "Stopped monitoring AAPL");
        assert!(!scheduler.is_monitoring("AAPL"));

        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(scheduler.store().len("AAPL"), 1);
    }

    #[tokio::test]
    async fn test_stop_unmonitored_symbol_is_negative() {
        let scheduler = scheduler_with(Arc::new(StubProvider::priced(10.0)));

        let result = scheduler.stop("NOPE");
        assert!(!result.success);
        assert_eq!(result.message, "No active monitor for NOPE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleting_history_keeps_monitoring() {
        let scheduler = scheduler_with(Arc::new(StubProvider::priced(10.0)));

        scheduler.start("AAPL", 0.0, 1.0).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(scheduler.store().delete_all("AAPL").success);
        assert!(scheduler.is_monitoring("AAPL"));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(scheduler.store().len("AAPL"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_cancel_timer() {
        let provider = Arc::new(StubProvider::failing());
        let scheduler = scheduler_with(provider.clone());

        scheduler.start("AAPL", 0.0, 1.0).unwrap();
        tokio::time::sleep(Duration::from_millis(2050)).await;

        assert!(scheduler.is_monitoring("AAPL"));
        assert_eq!(provider.call_count(), 3);
        assert!(scheduler.store().get("AAPL").is_empty());
    }

    #[tokio::test]
    async fn test_refresh_now_records_and_returns() {
        let scheduler = scheduler_with(Arc::new(StubProvider::priced(42.0)));

        let record = scheduler.refresh_now("MSFT").await.unwrap();
        assert_eq!(record.current, 42.0);
        assert_eq!(scheduler.store().latest("MSFT"), Some(record));
        assert!(!scheduler.is_monitoring("MSFT"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitors_listing_and_shutdown() {
        let scheduler = scheduler_with(Arc::new(StubProvider::priced(10.0)));

        scheduler.start("MSFT", 1.0, 0.0).unwrap();
        scheduler.start("AAPL", 0.0, 5.0).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let monitors = scheduler.monitors();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[0].symbol, "AAPL");
        assert_eq!(monitors[0].interval_ms, 5000);
        assert_eq!(monitors[0].records, 1);
        assert_eq!(monitors[1].interval_ms, 60_000);

        assert_eq!(scheduler.shutdown(), 2);
        assert_eq!(scheduler.active_count(), 0);
    }
}
