use thiserror::Error;

/// Errors returned by monitor control operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// Blank symbol, or a negative / non-finite interval component
    #[error("Invalid input parameters: {0}")]
    InvalidInput(String),
}
