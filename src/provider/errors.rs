use thiserror::Error;

/// Failures talking to the quote provider
///
/// These never leave the fetch boundary: the scheduler logs them and reports a
/// missing record instead.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No API credential was configured for the provider
    #[error("FINNHUB_API_KEY not set in environment")]
    MissingCredential,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from quote provider: {0}")]
    InvalidResponse(String),
}
