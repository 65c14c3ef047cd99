//! Trade persistence seam.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use tradebook_common::{BookedTrade, NewTrade, TradeId};

use crate::error::{BookingError, BookingResult};

/// Remote trade persistence and booked-trades listing.
#[async_trait]
pub trait TradeStore: Send + Sync {
    /// Persist a trade, returning it with its assigned identifier.
    async fn submit(&self, trade: &NewTrade) -> BookingResult<BookedTrade>;

    /// List booked trades in the order the service delivers them.
    async fn list_trades(&self) -> BookingResult<Vec<BookedTrade>>;
}

/// Store keeping trades in memory, in booking order.
#[derive(Default)]
pub struct InMemoryTradeStore {
    trades: RwLock<Vec<BookedTrade>>,
    submissions: AtomicUsize,
    fail_submit: AtomicBool,
    fail_list: AtomicBool,
}

impl InMemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent submissions fail.
    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent listings fail.
    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Number of submit calls received, including failed ones.
    pub fn submission_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.trades.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.read().is_empty()
    }
}

#[async_trait]
impl TradeStore for InMemoryTradeStore {
    async fn submit(&self, trade: &NewTrade) -> BookingResult<BookedTrade> {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(BookingError::StoreError("trade store unavailable".to_string()));
        }

        let booked = trade.clone().into_booked(TradeId::new());
        debug!(trade_id = %booked.id, "Stored trade");
        self.trades.write().push(booked.clone());
        Ok(booked)
    }

    async fn list_trades(&self) -> BookingResult<Vec<BookedTrade>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(BookingError::StoreError("trade list unavailable".to_string()));
        }
        Ok(self.trades.read().clone())
    }
}
