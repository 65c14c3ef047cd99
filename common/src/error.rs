//! Validation errors shared by the Tradebook crates.

use thiserror::Error;

/// Errors raised while validating user supplied values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Currency code is empty or not alphabetic.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Amount is not a positive decimal number.
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
}

impl CommonError {
    /// Get a stable error code for presentation layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            CommonError::InvalidCurrency(_) => "INVALID_CURRENCY",
            CommonError::InvalidAmount(_) => "INVALID_AMOUNT",
        }
    }
}

/// Result type alias for common validation.
pub type Result<T> = std::result::Result<T, CommonError>;
