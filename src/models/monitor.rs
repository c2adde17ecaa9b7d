use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

/// Outcome of a control operation
///
/// `success: false` is a normal outcome (nothing to stop, nothing to delete), not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorResult {
    pub success: bool,
    #[schema(example = "Started monitoring AAPL")]
    pub message: String,
    /// Resolved polling interval, present on a successful start
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = 60000)]
    pub interval_ms: Option<u64>,
}

impl MonitorResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            interval_ms: None,
        }
    }

    pub fn negative(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            interval_ms: None,
        }
    }

    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = Some(interval_ms);
        self
    }
}

/// An active monitor as reported by `GET /monitors`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorInfo {
    pub symbol: String,
    pub interval_ms: u64,
    /// When the current timer was installed (RFC 3339)
    pub started_at: String,
    /// Records currently held in history for the symbol
    pub records: usize,
}

/// Request to start polling a symbol
///
/// Fields are read leniently: a symbol that is missing, not a string, or blank is
/// treated as absent (surrounding whitespace is trimmed); `minutes`/`seconds` accept numbers or numeric strings and fall
/// back to 0.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct StartMonitoringRequest {
    #[serde(default, deserialize_with = "lenient_symbol")]
    #[schema(value_type = String, example = "AAPL")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    #[schema(example = 1)]
    pub minutes: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    #[schema(example = 30)]
    pub seconds: f64,
}

/// Request body carrying only a symbol
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SymbolRequest {
    #[serde(default, deserialize_with = "lenient_symbol")]
    #[schema(value_type = String, example = "AAPL")]
    pub symbol: Option<String>,
}

/// `?symbol=` query parameter
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SymbolQuery {
    /// Ticker symbol
    pub symbol: Option<String>,
}

impl SymbolQuery {
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref().and_then(normalize_symbol)
    }
}

/// Trimmed symbol, or `None` when blank
///
/// Every request shape (body or query) goes through this.
pub fn normalize_symbol(raw: &str) -> Option<&str> {
    let symbol = raw.trim();
    (!symbol.is_empty()).then_some(symbol)
}

fn lenient_symbol<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => normalize_symbol(&s).map(str::to_string),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    Ok(if n.is_nan() { 0.0 } else { n })
}
