//! Trade records exchanged with the persistence service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Currency, Timestamp, TradeId};

/// A trade ready to be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrade {
    pub sell_currency: Currency,
    pub sell_amount: Decimal,
    pub buy_currency: Currency,
    pub buy_amount: Decimal,
    /// Rate at booking time, rounded to four decimal places.
    pub rate: Decimal,
    pub booked_at: Timestamp,
}

impl NewTrade {
    /// Attach the identifier assigned by the persistence service.
    pub fn into_booked(self, id: TradeId) -> BookedTrade {
        BookedTrade {
            id,
            sell_currency: self.sell_currency,
            sell_amount: self.sell_amount,
            buy_currency: self.buy_currency,
            buy_amount: self.buy_amount,
            rate: self.rate,
            booked_at: self.booked_at,
        }
    }
}

/// A trade as listed by the booked-trades provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedTrade {
    pub id: TradeId,
    pub sell_currency: Currency,
    pub sell_amount: Decimal,
    pub buy_currency: Currency,
    pub buy_amount: Decimal,
    pub rate: Decimal,
    pub booked_at: Timestamp,
}

/// Order trades newest first, the order the booked-trades list is displayed in.
pub fn sort_by_booked_at_desc(trades: &mut [BookedTrade]) {
    trades.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
}
