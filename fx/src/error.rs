//! FX error types.

use thiserror::Error;
use tradebook_common::CurrencyPair;

/// Errors that can occur while obtaining or reading rates.
#[derive(Debug, Error)]
pub enum FxError {
    /// Rate not available for the requested currency pair.
    #[error("Rate not available for {0}")]
    RateNotAvailable(CurrencyPair),

    /// Provider failed to deliver a snapshot.
    #[error("Rate provider error: {0}")]
    ProviderError(String),

    /// Snapshot could not be decoded.
    #[error("Invalid rate snapshot: {0}")]
    InvalidSnapshot(String),
}

impl From<serde_json::Error> for FxError {
    fn from(e: serde_json::Error) -> Self {
        FxError::InvalidSnapshot(e.to_string())
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
