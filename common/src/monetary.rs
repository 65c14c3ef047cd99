//! Currency codes and decimal amount helpers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommonError;

/// Decimal places used for displayed sell/buy amounts.
pub const AMOUNT_DECIMAL_PLACES: u32 = 2;

/// Decimal places a rate is rounded to when a trade is booked.
pub const RATE_DECIMAL_PLACES: u32 = 4;

/// Currency code such as `USD`.
///
/// Input is case-insensitive; the code is stored trimmed and upper-cased so
/// `usd`, `Usd` and ` USD ` all compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code, canonicalizing case.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    /// Parse user input, rejecting empty or non-alphabetic codes.
    pub fn parse(code: &str) -> Result<Self, CommonError> {
        let currency = Self::new(code);
        if currency.0.is_empty() || !currency.0.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CommonError::InvalidCurrency(code.to_string()));
        }
        Ok(currency)
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl FromStr for Currency {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A directed currency pair: amounts in `from` multiplied by the pair's
/// rate give amounts in `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// Currency being sold.
    pub from: Currency,
    /// Currency being bought.
    pub to: Currency,
}

impl CurrencyPair {
    /// Create a new currency pair.
    pub fn new(from: Currency, to: Currency) -> Self {
        Self { from, to }
    }

    /// Get the inverse pair.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    /// A pair converting a currency into itself has no rate entry.
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// Parse a decimal amount as typed by a user.
///
/// Accepts plain (`"500"`, `" 12.5 "`) and scientific (`"1e3"`) notation.
/// Returns `None` for anything else, including the empty string and
/// digit separators such as `"1_000"`.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.contains('_') {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Parse an amount that must be strictly positive.
pub fn parse_positive_amount(input: &str) -> Option<Decimal> {
    parse_amount(input).filter(|value| value.is_sign_positive() && !value.is_zero())
}

/// Round half-up (midpoint away from zero) to `dp` decimal places.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round and render with exactly `dp` fractional digits, e.g. `425.00`.
///
/// Returns `None` when the value is too large to carry `dp` digits.
pub fn format_fixed(value: Decimal, dp: u32) -> Option<String> {
    let mut rounded = round_half_up(value, dp);
    rounded.rescale(dp);
    (rounded.scale() == dp).then(|| rounded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_is_case_insensitive() {
        assert_eq!(Currency::new("usd"), Currency::usd());
        assert_eq!(Currency::new(" Eur "), Currency::eur());
        assert_eq!(Currency::new("gbp").code(), "GBP");
    }

    #[test]
    fn test_currency_parse_rejects_garbage() {
        assert!(Currency::parse("").is_err());
        assert!(Currency::parse("   ").is_err());
        assert!(Currency::parse("US1").is_err());
        assert_eq!(Currency::parse("chf").unwrap().code(), "CHF");
    }

    #[test]
    fn test_currency_deserializes_canonical() {
        let currency: Currency = serde_json::from_str("\"jpy\"").unwrap();
        assert_eq!(currency.code(), "JPY");
        assert_eq!(serde_json::to_string(&currency).unwrap(), "\"JPY\"");
    }

    #[test]
    fn test_pair_inverse() {
        let pair = CurrencyPair::new(Currency::usd(), Currency::eur());
        assert_eq!(pair.inverse(), CurrencyPair::new(Currency::eur(), Currency::usd()));
        assert_eq!(pair.to_string(), "USD/EUR");
        assert!(!pair.is_identity());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("500"), Some(dec!(500)));
        assert_eq!(parse_amount(" 12.50 "), Some(dec!(12.50)));
        assert_eq!(parse_amount("1e3"), Some(dec!(1000)));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1_000"), None);
    }

    #[test]
    fn test_parse_positive_amount() {
        assert_eq!(parse_positive_amount("0.01"), Some(dec!(0.01)));
        assert_eq!(parse_positive_amount("0"), None);
        assert_eq!(parse_positive_amount("-5"), None);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(dec!(1.005), 2), dec!(1.01));
        assert_eq!(round_half_up(dec!(117.647058), 2), dec!(117.65));
        assert_eq!(round_half_up(dec!(0.85004999), 4), dec!(0.8500));
    }

    #[test]
    fn test_format_fixed_pads() {
        assert_eq!(format_fixed(dec!(425), 2).as_deref(), Some("425.00"));
        assert_eq!(format_fixed(dec!(117.6470588), 2).as_deref(), Some("117.65"));
        assert_eq!(format_fixed(dec!(0.85), 4).as_deref(), Some("0.8500"));
    }

    #[test]
    fn test_format_fixed_out_of_range() {
        assert_eq!(format_fixed(Decimal::MAX, 2), None);
        assert_eq!(format_fixed(Decimal::MAX, 0), Some(Decimal::MAX.to_string()));
    }
}
