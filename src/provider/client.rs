use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::AppConfig;
use crate::models::ProviderQuote;

use super::errors::ProviderError;
use super::QuoteProvider;

/// Header carrying the API key, so it never appears in a URL
const TOKEN_HEADER: &str = "X-Finnhub-Token";

/// HTTP client for the Finnhub `/quote` endpoint
#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FinnhubClient {
    /// Build a client. No request timeout is applied unless one is given.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            config.finnhub_base_url.clone(),
            config.api_key.clone(),
            config.request_timeout,
        )
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl QuoteProvider for FinnhubClient {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;
        let url = format!("{}/quote", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("symbol", symbol)])
            .header(TOKEN_HEADER, api_key)
            .send()
            .await?
            .error_for_status()?;

        let body = resp.text().await?;
        let quote = if body.trim().is_empty() {
            ProviderQuote::default()
        } else {
            serde_json::from_str::<ProviderQuote>(&body)
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?
        };

        debug!(current = ?quote.current, time = ?quote.timestamp, "finnhub quote fetched");

        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_fails_without_network() {
        let client = FinnhubClient::new("http://127.0.0.1:9", None, None).unwrap();
        assert!(!client.has_credential());

        let err = client.fetch_quote("AAPL").await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }

    #[tokio::test]
    async fn test_key_sent_as_header_and_absent_from_errors() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            socket
                .write_all(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await
                .unwrap();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });

        let client =
            FinnhubClient::new(format!("http://{}", addr), Some("SUPERSECRET".to_string()), None)
                .unwrap();
        let err = client.fetch_quote("AAPL").await.unwrap_err();
        let request = server.await.unwrap();

        assert!(matches!(err, ProviderError::Http(_)));
        assert!(!err.to_string().contains("SUPERSECRET"));
        assert!(!format!("{:?}", err).contains("SUPERSECRET"));

        let request_line = request.lines().next().unwrap();
        assert!(request_line.contains("symbol=AAPL"));
        assert!(!request_line.contains("SUPERSECRET"));
        assert!(request.to_ascii_lowercase().contains("x-finnhub-token: supersecret"));
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let client = FinnhubClient::new("http://localhost/", Some(String::new()), None).unwrap();
        assert!(!client.has_credential());
        assert_eq!(client.base_url, "http://localhost");
    }
}
