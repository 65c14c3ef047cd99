//! Booking form state.

use rust_decimal::Decimal;
use tradebook_common::{Currency, CurrencyPair};

/// Which amount field the user touched most recently.
///
/// The other field is the one derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditedField {
    SellAmount,
    BuyAmount,
}

/// Current selection and amounts of a booking form.
///
/// Amounts are kept as typed, so malformed input survives until the
/// user corrects it. `active_rate` is zero while the pair is unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionState {
    pub sell_currency: Option<Currency>,
    pub buy_currency: Option<Currency>,
    pub sell_amount: Option<String>,
    pub buy_amount: Option<String>,
    pub active_rate: Decimal,
    pub last_edited: Option<EditedField>,
}

impl ConversionState {
    /// A fresh, empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected pair, once both currencies are chosen.
    pub fn pair(&self) -> Option<CurrencyPair> {
        match (&self.sell_currency, &self.buy_currency) {
            (Some(sell), Some(buy)) => Some(CurrencyPair::new(sell.clone(), buy.clone())),
            _ => None,
        }
    }

    /// Whether an active rate governs derivation.
    pub fn rate_resolved(&self) -> bool {
        self.active_rate > Decimal::ZERO
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
