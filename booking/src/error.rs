//! Booking error types.

use std::fmt;

use thiserror::Error;
use tradebook_common::CommonError;
use tradebook_fx::FxError;

/// A field of the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeField {
    SellCurrency,
    SellAmount,
    BuyCurrency,
    BuyAmount,
    Rate,
}

impl fmt::Display for TradeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TradeField::SellCurrency => "sell currency",
            TradeField::SellAmount => "sell amount",
            TradeField::BuyCurrency => "buy currency",
            TradeField::BuyAmount => "buy amount",
            TradeField::Rate => "rate",
        };
        f.write_str(name)
    }
}

fn join_fields(fields: &[TradeField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur while booking a trade.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Required fields are absent or the rate is unresolved.
    #[error("Submission rejected, missing or invalid: {}", join_fields(.missing))]
    SubmissionRejected { missing: Vec<TradeField> },

    /// A previous submission has not resolved yet.
    #[error("A trade submission is already in flight")]
    SubmissionInFlight,

    /// Trade persistence service failed.
    #[error("Trade store error: {0}")]
    StoreError(String),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error(transparent)]
    Fx(#[from] FxError),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl BookingError {
    /// Get error code for presentation layers.
    pub fn error_code(&self) -> &'static str {
        match self {
            BookingError::SubmissionRejected { .. } => "SUBMISSION_REJECTED",
            BookingError::SubmissionInFlight => "SUBMISSION_IN_FLIGHT",
            BookingError::StoreError(_) => "STORE_ERROR",
            BookingError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            BookingError::Fx(_) => "PROVIDER_FAILURE",
            BookingError::Common(e) => e.error_code(),
        }
    }
}

/// Result type for booking operations.
pub type BookingResult<T> = Result<T, BookingError>;
