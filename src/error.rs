//! Error types for the SEO scan engine.
//!
//! `AppError` covers the handful of failure classes callers can react to;
//! everything else funnels through `Other(anyhow::Error)`. Per-check
//! failures never surface here: they land in the report's error log.

use thiserror::Error;

/// Domain-specific errors for engine and scan-service operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid or malformed URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Scan record not found in the store
    #[error("Scan not found: {0}")]
    ScanNotFound(String),

    /// The whole analysis batch ran past its deadline
    #[error("Analysis deadline exceeded after {0} seconds")]
    DeadlineExceeded(u64),

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }
}

/// Result type alias using AppError.
pub type Result<T> = std::result::Result<T, AppError>;
