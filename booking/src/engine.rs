//! Bidirectional amount derivation.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};
use tradebook_common::{
    format_fixed, parse_positive_amount, round_half_up, Currency, NewTrade, Timestamp,
    AMOUNT_DECIMAL_PLACES, RATE_DECIMAL_PLACES,
};
use tradebook_fx::{RateTable, SharedRateTable};

use crate::config::BookingConfig;
use crate::error::{BookingError, BookingResult, TradeField};
use crate::state::{ConversionState, EditedField};

/// Derives whichever amount the user did not just edit from the active rate.
///
/// Derivation is skipped, never failed: without a positive rate or a
/// positive source amount the dependent field keeps its last value.
#[derive(Debug, Clone)]
pub struct ConversionEngine {
    table: SharedRateTable,
    state: ConversionState,
    amount_decimal_places: u32,
    rate_decimal_places: u32,
}

impl ConversionEngine {
    /// Create an engine over a rate table with an empty form.
    pub fn new(table: SharedRateTable) -> Self {
        Self::with_state(table, ConversionState::new())
    }

    /// Create an engine resuming an existing form state.
    pub fn with_state(table: SharedRateTable, state: ConversionState) -> Self {
        Self {
            table,
            state,
            amount_decimal_places: AMOUNT_DECIMAL_PLACES,
            rate_decimal_places: RATE_DECIMAL_PLACES,
        }
    }

    /// Create an engine using the precision from configuration.
    pub fn with_config(table: SharedRateTable, config: &BookingConfig) -> Self {
        let mut engine = Self::new(table);
        engine.amount_decimal_places = config.amount_decimal_places;
        engine.rate_decimal_places = config.rate_decimal_places;
        engine
    }

    /// Engine over a table with no rates.
    pub fn unavailable() -> Self {
        Self::new(Arc::new(RateTable::empty()))
    }

    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    /// Give up the engine, keeping the form state.
    pub fn into_state(self) -> ConversionState {
        self.state
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Select the currency to sell and re-resolve the rate.
    pub fn set_sell_currency(&mut self, code: Currency) {
        self.state.sell_currency = Some(code);
        self.refresh_rate();
    }

    /// Select the currency to buy and re-resolve the rate.
    pub fn set_buy_currency(&mut self, code: Currency) {
        self.state.buy_currency = Some(code);
        self.refresh_rate();
    }

    /// Record a typed sell amount and derive the buy amount from it.
    pub fn set_sell_amount(&mut self, value: impl Into<String>) {
        self.state.sell_amount = normalize_input(value.into());
        self.state.last_edited = Some(EditedField::SellAmount);
        self.derive_buy_amount();
    }

    /// Record a typed buy amount and derive the sell amount from it.
    pub fn set_buy_amount(&mut self, value: impl Into<String>) {
        self.state.buy_amount = normalize_input(value.into());
        self.state.last_edited = Some(EditedField::BuyAmount);
        self.derive_sell_amount();
    }

    /// Resolve the active rate for the selected pair, then re-derive the
    /// amount opposite to the user's last edit.
    ///
    /// Does nothing until both currencies are selected.
    pub fn refresh_rate(&mut self) {
        let (Some(sell), Some(buy)) = (&self.state.sell_currency, &self.state.buy_currency) else {
            return;
        };

        let rate = self.table.lookup(sell, buy);
        debug!(sell = %sell, buy = %buy, rate = ?rate, "Resolved active rate");
        self.state.active_rate = rate.unwrap_or(Decimal::ZERO);

        match self.state.last_edited {
            Some(EditedField::BuyAmount) => self.derive_sell_amount(),
            Some(EditedField::SellAmount) | None => self.derive_buy_amount(),
        }
    }

    /// `buy = round(sell * rate)` when both are positive.
    pub fn derive_buy_amount(&mut self) {
        if !self.state.rate_resolved() {
            return;
        }
        let Some(sell) = self.state.sell_amount.as_deref().and_then(parse_positive_amount) else {
            return;
        };

        let buy = sell
            .checked_mul(self.state.active_rate)
            .and_then(|buy| format_fixed(buy, self.amount_decimal_places));
        match buy {
            Some(buy) => self.state.buy_amount = Some(buy),
            None => warn!(sell = %sell, rate = %self.state.active_rate, "Buy amount out of range"),
        }
    }

    /// `sell = round(buy / rate)` when both are positive.
    pub fn derive_sell_amount(&mut self) {
        if !self.state.rate_resolved() {
            return;
        }
        let Some(buy) = self.state.buy_amount.as_deref().and_then(parse_positive_amount) else {
            return;
        };

        let sell = buy
            .checked_div(self.state.active_rate)
            .and_then(|sell| format_fixed(sell, self.amount_decimal_places));
        match sell {
            Some(sell) => self.state.sell_amount = Some(sell),
            None => warn!(buy = %buy, rate = %self.state.active_rate, "Sell amount out of range"),
        }
    }

    /// Swap in a freshly built table and re-apply it to the current form.
    pub fn on_rate_table(&mut self, table: SharedRateTable) {
        self.table = table;
        self.refresh_rate();
    }

    /// Clear the form.
    pub fn reset(&mut self) {
        self.state = ConversionState::new();
    }

    /// Build the trade to submit, or list every field that blocks it.
    pub fn draft_trade(&self, booked_at: Timestamp) -> BookingResult<NewTrade> {
        let state = &self.state;
        let mut missing = Vec::new();

        if state.sell_currency.is_none() {
            missing.push(TradeField::SellCurrency);
        }
        let sell_amount = state.sell_amount.as_deref().and_then(parse_positive_amount);
        if sell_amount.is_none() {
            missing.push(TradeField::SellAmount);
        }
        if state.buy_currency.is_none() {
            missing.push(TradeField::BuyCurrency);
        }
        let buy_amount = state.buy_amount.as_deref().and_then(parse_positive_amount);
        if buy_amount.is_none() {
            missing.push(TradeField::BuyAmount);
        }
        let rate = round_half_up(state.active_rate, self.rate_decimal_places);
        if rate <= Decimal::ZERO {
            missing.push(TradeField::Rate);
        }

        match (&state.sell_currency, sell_amount, &state.buy_currency, buy_amount) {
            (Some(sell_currency), Some(sell_amount), Some(buy_currency), Some(buy_amount))
                if missing.is_empty() =>
            {
                Ok(NewTrade {
                    sell_currency: sell_currency.clone(),
                    sell_amount,
                    buy_currency: buy_currency.clone(),
                    buy_amount,
                    rate,
                    booked_at,
                })
            }
            _ => Err(BookingError::SubmissionRejected { missing }),
        }
    }
}

fn normalize_input(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
