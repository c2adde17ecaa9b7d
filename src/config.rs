use std::time::Duration;

/// Environment variable holding the provider credential
pub const API_KEY_VAR: &str = "FINNHUB_API_KEY";

/// Fallback credential variable, read when [`API_KEY_VAR`] is unset or blank
pub const API_KEY_FALLBACK_VAR: &str = "API_KEY";

/// Process-wide settings, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP control surface listens on
    pub bind_addr: String,

    /// Quote provider base URL (without trailing `/quote`)
    pub finnhub_base_url: String,

    /// Provider credential; `None` makes every fetch a soft failure
    pub api_key: Option<String>,

    /// Outbound request timeout. Unset means requests may hang indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            finnhub_base_url: default_base_url(),
            api_key: None,
            request_timeout: None,
        }
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_VAR).or_else(|| non_empty(API_KEY_FALLBACK_VAR));

        let request_timeout = non_empty("QUOTE_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(default_bind_addr),
            finnhub_base_url: non_empty("FINNHUB_BASE_URL").unwrap_or_else(default_base_url),
            api_key,
            request_timeout,
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_base_url() -> String {
    "https://finnhub.io/api/v1".to_string()
}
