use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Diagnostic attached to records whose provider payload carried no usable prices
pub const EMPTY_DATA_WARNING: &str = "empty-or-zero-data-from-finnhub";

/// Raw quote payload returned by the provider
///
/// Every field is optional: an error or an unknown symbol comes back as an empty
/// object (or one holding only an `error` key) rather than a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuote {
    /// Open price of the day
    #[serde(rename = "o", default)]
    pub open: Option<f64>,
    /// High price of the day
    #[serde(rename = "h", default)]
    pub high: Option<f64>,
    /// Low price of the day
    #[serde(rename = "l", default)]
    pub low: Option<f64>,
    /// Current price
    #[serde(rename = "c", default)]
    pub current: Option<f64>,
    /// Previous close price
    #[serde(rename = "pc", default)]
    pub previous_close: Option<f64>,
    /// Absolute change against previous close
    #[serde(rename = "d", default)]
    pub change: Option<f64>,
    /// Percent change against previous close
    #[serde(rename = "dp", default)]
    pub percent_change: Option<f64>,
    /// Quote timestamp (epoch seconds)
    #[serde(rename = "t", default)]
    pub timestamp: Option<i64>,
}

impl ProviderQuote {
    /// True when the payload carried none of the known fields
    pub fn is_empty(&self) -> bool {
        *self == ProviderQuote::default()
    }
}

/// One observation of a symbol's quote, immutable once appended to history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    #[schema(example = "AAPL")]
    pub symbol: String,
    #[schema(example = 189.3)]
    pub open: f64,
    #[schema(example = 191.05)]
    pub high: f64,
    #[schema(example = 188.72)]
    pub low: f64,
    #[schema(example = 190.64)]
    pub current: f64,
    #[schema(example = 188.9)]
    pub previous_close: f64,
    /// Local clock at record creation (epoch milliseconds)
    #[schema(example = 1760601600000_i64)]
    pub fetched_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<f64>,
    /// Provider-side quote time (epoch seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl QuoteRecord {
    /// Map a provider payload into a record stamped with `fetched_at`
    ///
    /// Missing prices become zero. A payload that is empty or whose five prices are
    /// all zero is kept, but flagged with [`EMPTY_DATA_WARNING`].
    pub fn from_provider(symbol: &str, quote: &ProviderQuote, fetched_at: i64) -> Self {
        let mut record = Self {
            symbol: symbol.to_string(),
            open: quote.open.unwrap_or(0.0),
            high: quote.high.unwrap_or(0.0),
            low: quote.low.unwrap_or(0.0),
            current: quote.current.unwrap_or(0.0),
            previous_close: quote.previous_close.unwrap_or(0.0),
            fetched_at,
            change: quote.change,
            percent_change: quote.percent_change,
            quote_time: quote.timestamp.filter(|t| *t > 0),
            warning: None,
        };

        if quote.is_empty() || record.all_prices_zero() {
            record.warning = Some(EMPTY_DATA_WARNING.to_string());
        }

        record
    }

    fn all_prices_zero(&self) -> bool {
        [self.open, self.high, self.low, self.current, self.previous_close]
            .iter()
            .all(|p| *p == 0.0)
    }
}
