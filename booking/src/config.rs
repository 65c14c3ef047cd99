//! Booking configuration.

use tradebook_common::{Currency, AMOUNT_DECIMAL_PLACES, RATE_DECIMAL_PLACES};

use crate::error::{BookingError, BookingResult};

/// Largest scale a `Decimal` can carry.
const MAX_DECIMAL_PLACES: u32 = 28;

/// Main booking configuration.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Base currency rates are requested for when a form opens.
    pub base_currency: String,
    /// Decimal places derived amounts are rounded to.
    pub amount_decimal_places: u32,
    /// Decimal places the rate is rounded to when a trade is booked.
    pub rate_decimal_places: u32,
    /// Log level.
    pub log_level: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            base_currency: "EUR".to_string(),
            amount_decimal_places: AMOUNT_DECIMAL_PLACES,
            rate_decimal_places: RATE_DECIMAL_PLACES,
            log_level: "info".to_string(),
        }
    }
}

impl BookingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("TRADEBOOK_BASE_CURRENCY") {
            config.base_currency = base;
        }

        if let Ok(places) = std::env::var("TRADEBOOK_AMOUNT_DECIMALS") {
            if let Ok(places) = places.parse() {
                config.amount_decimal_places = places;
            }
        }

        if let Ok(places) = std::env::var("TRADEBOOK_RATE_DECIMALS") {
            if let Ok(places) = places.parse() {
                config.rate_decimal_places = places;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Parsed base currency.
    pub fn base_currency(&self) -> BookingResult<Currency> {
        Ok(Currency::parse(&self.base_currency)?)
    }

    /// Validate configuration.
    pub fn validate(&self) -> BookingResult<()> {
        self.base_currency()?;

        if self.amount_decimal_places > MAX_DECIMAL_PLACES
            || self.rate_decimal_places > MAX_DECIMAL_PLACES
        {
            return Err(BookingError::ConfigurationError(format!(
                "Decimal places cannot exceed {}",
                MAX_DECIMAL_PLACES
            )));
        }

        if self.rate_decimal_places < self.amount_decimal_places {
            return Err(BookingError::ConfigurationError(
                "Rate precision cannot be lower than amount precision".to_string(),
            ));
        }

        Ok(())
    }
}
