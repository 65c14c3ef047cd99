//! Booking session: wires rate snapshots, the conversion engine, trade
//! submission and the booked-trades list together.
//!
//! All mutation happens through `&mut self` in response to one discrete
//! event at a time, so no locking is involved. Fetches are awaited by the
//! caller and their results applied in arrival order.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use tradebook_common::{now, round_half_up, sort_by_booked_at_desc, BookedTrade, Currency, NewTrade};
use tradebook_fx::{FxResult, RateProvider, RateSnapshot, RateTable};

use crate::config::BookingConfig;
use crate::engine::ConversionEngine;
use crate::error::{BookingError, BookingResult};
use crate::notification::Notification;
use crate::state::ConversionState;
use crate::store::TradeStore;

/// A rate quoted from the selected sell currency, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableRate {
    pub currency: Currency,
    pub rate: Decimal,
}

/// Clears the session's in-flight flag when dropped.
#[derive(Debug)]
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A drafted trade whose submission has started but not resolved.
///
/// The session stays in flight for as long as this value lives, so a
/// cancelled or abandoned submission frees the form again.
#[derive(Debug)]
#[must_use = "dropping a pending submission abandons it"]
pub struct PendingSubmission {
    trade: NewTrade,
    _in_flight: InFlightGuard,
}

impl PendingSubmission {
    pub fn trade(&self) -> &NewTrade {
        &self.trade
    }
}

/// One open booking form and the lists around it.
pub struct BookingSession {
    provider: Arc<dyn RateProvider>,
    store: Arc<dyn TradeStore>,
    engine: ConversionEngine,
    base_currency: Currency,
    booked_trades: Vec<BookedTrade>,
    notifications: Vec<Notification>,
    submission_in_flight: Arc<AtomicBool>,
    config: BookingConfig,
}

impl BookingSession {
    /// Create a session with no rates loaded yet.
    pub fn new(
        provider: Arc<dyn RateProvider>,
        store: Arc<dyn TradeStore>,
        config: BookingConfig,
    ) -> BookingResult<Self> {
        config.validate()?;
        let base_currency = config.base_currency()?;
        let engine = ConversionEngine::with_config(Arc::new(RateTable::empty()), &config);

        Ok(Self {
            provider,
            store,
            engine,
            base_currency,
            booked_trades: Vec::new(),
            notifications: Vec::new(),
            submission_in_flight: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }

    /// Engine for user edits (currency and amount changes).
    pub fn engine_mut(&mut self) -> &mut ConversionEngine {
        &mut self.engine
    }

    pub fn state(&self) -> &ConversionState {
        self.engine.state()
    }

    pub fn base_currency(&self) -> &Currency {
        &self.base_currency
    }

    /// Currencies known to the current rate table.
    pub fn currencies(&self) -> &BTreeSet<Currency> {
        self.engine.table().currencies()
    }

    /// Fetch a fresh snapshot for the base currency and apply it.
    #[instrument(skip(self), fields(base = %self.base_currency, provider = self.provider.name()))]
    pub async fn reload_rates(&mut self) -> FxResult<()> {
        let result = self.provider.fetch_snapshot(&self.base_currency).await;
        self.apply_snapshot(result)
    }

    /// Change the base currency and re-fetch rates for it.
    pub async fn set_base_currency(&mut self, code: &str) -> BookingResult<()> {
        self.base_currency = Currency::parse(code)?;
        self.reload_rates().await?;
        Ok(())
    }

    /// Snapshot arrival callback.
    ///
    /// A snapshot replaces the whole table and is re-applied to the form.
    /// A failure leaves the form with no rates at all.
    pub fn apply_snapshot(&mut self, result: FxResult<RateSnapshot>) -> FxResult<()> {
        match result {
            Ok(snapshot) => {
                let table = RateTable::build(&snapshot);
                info!(pairs = table.len(), currencies = table.currencies().len(), "Rate table rebuilt");
                self.engine.on_rate_table(Arc::new(table));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Rate snapshot unavailable");
                self.engine.on_rate_table(Arc::new(RateTable::empty()));
                self.notifications
                    .push(Notification::error("Error fetching exchange rates", e.to_string()));
                Err(e)
            }
        }
    }

    /// Reload the booked-trades list. On failure the previous list is kept.
    #[instrument(skip(self))]
    pub async fn reload_trades(&mut self) -> BookingResult<()> {
        match self.store.list_trades().await {
            Ok(trades) => {
                self.booked_trades = trades;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Booked trades unavailable");
                self.notifications
                    .push(Notification::error("Error loading trades", e.to_string()));
                Err(e)
            }
        }
    }

    /// Booked trades as delivered by the store.
    pub fn booked_trades(&self) -> &[BookedTrade] {
        &self.booked_trades
    }

    /// Booked trades in display order, newest booking first.
    pub fn trades_newest_first(&self) -> Vec<BookedTrade> {
        let mut trades = self.booked_trades.clone();
        sort_by_booked_at_desc(&mut trades);
        trades
    }

    /// Rates quoted from the selected sell currency, sorted by code and
    /// rounded for display. Empty until a sell currency is chosen.
    pub fn available_rates(&self) -> Vec<AvailableRate> {
        let Some(sell) = &self.state().sell_currency else {
            return Vec::new();
        };

        let mut rates: Vec<AvailableRate> = self
            .engine
            .table()
            .rates_for(sell)
            .map(|(currency, rate)| AvailableRate {
                currency: currency.clone(),
                rate: round_half_up(rate, self.config.rate_decimal_places),
            })
            .collect();
        rates.sort_by(|a, b| a.currency.cmp(&b.currency));
        rates
    }

    pub fn is_submitting(&self) -> bool {
        self.submission_in_flight.load(Ordering::SeqCst)
    }

    /// Validate the form and mark a submission as in flight.
    ///
    /// The form state is left untouched whether or not this succeeds.
    pub fn begin_submission(&mut self) -> BookingResult<PendingSubmission> {
        if self.is_submitting() {
            return Err(BookingError::SubmissionInFlight);
        }

        match self.engine.draft_trade(now()) {
            Ok(trade) => {
                self.submission_in_flight.store(true, Ordering::SeqCst);
                Ok(PendingSubmission {
                    trade,
                    _in_flight: InFlightGuard(Arc::clone(&self.submission_in_flight)),
                })
            }
            Err(e) => {
                warn!(error = %e, "Trade submission rejected");
                self.notifications
                    .push(Notification::error("Error", "All fields must have a value."));
                Err(e)
            }
        }
    }

    /// Resolve a pending submission with the store's answer.
    ///
    /// On success the form is cleared and the trades list reloaded; on
    /// failure the form is kept so the user can retry.
    pub async fn finish_submission(
        &mut self,
        pending: PendingSubmission,
        result: BookingResult<BookedTrade>,
    ) -> BookingResult<BookedTrade> {
        let PendingSubmission { trade, _in_flight: guard } = pending;
        drop(guard);

        match result {
            Ok(booked) => {
                info!(
                    trade_id = %booked.id,
                    sell = %trade.sell_currency,
                    buy = %trade.buy_currency,
                    rate = %booked.rate,
                    "Trade booked"
                );
                self.notifications
                    .push(Notification::success("Success", "Trade saved successfully!"));
                self.engine.reset();
                // A failed reload is already reported as a notification.
                let _ = self.reload_trades().await;
                Ok(booked)
            }
            Err(e) => {
                warn!(error = %e, "Trade submission failed");
                self.notifications
                    .push(Notification::error("Error saving trade", e.to_string()));
                Err(e)
            }
        }
    }

    /// Validate, persist and, on success, reset the form.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> BookingResult<BookedTrade> {
        let pending = self.begin_submission()?;
        let result = self.store.submit(pending.trade()).await;
        self.finish_submission(pending, result).await
    }

    /// Abandon the form.
    pub fn cancel(&mut self) {
        self.engine.reset();
    }

    /// Drain queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationLevel;
    use crate::store::InMemoryTradeStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tradebook_fx::{FxError, MockRateProvider};

    fn eur_snapshot() -> RateSnapshot {
        RateSnapshot::new()
            .with_rate("EUR", "USD", dec!(1.18))
            .with_rate("EUR", "GBP", dec!(0.88))
            .with_rate("USD", "EUR", dec!(0.85))
            .with_rate("USD", "GBP", dec!(0.75))
    }

    fn setup() -> (Arc<MockRateProvider>, Arc<InMemoryTradeStore>, BookingSession) {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_snapshot(Currency::eur(), eur_snapshot());
        provider.set_snapshot(
            Currency::usd(),
            RateSnapshot::new().with_rate("USD", "EUR", dec!(0.9)),
        );
        let store = Arc::new(InMemoryTradeStore::new());
        let session =
            BookingSession::new(provider.clone(), store.clone(), BookingConfig::default()).unwrap();
        (provider, store, session)
    }

    fn fill_usd_eur(session: &mut BookingSession, sell: &str) {
        let engine = session.engine_mut();
        engine.set_sell_currency(Currency::usd());
        engine.set_buy_currency(Currency::eur());
        engine.set_sell_amount(sell);
    }

    #[tokio::test]
    async fn test_reload_rates_feeds_engine() {
        let (provider, _, mut session) = setup();
        fill_usd_eur(&mut session, "500");
        assert_eq!(session.state().buy_amount, None);

        session.reload_rates().await.unwrap();

        assert_eq!(provider.request_count(&Currency::eur()), 1);
        assert_eq!(session.state().active_rate, dec!(0.85));
        assert_eq!(session.state().buy_amount.as_deref(), Some("425.00"));
        assert_eq!(session.currencies().len(), 3);
    }

    #[tokio::test]
    async fn test_base_currency_change_replaces_table() {
        let (provider, _, mut session) = setup();
        session.reload_rates().await.unwrap();
        fill_usd_eur(&mut session, "100");
        assert_eq!(session.state().buy_amount.as_deref(), Some("85.00"));

        session.set_base_currency("usd").await.unwrap();

        assert_eq!(session.base_currency(), &Currency::usd());
        assert_eq!(provider.request_count(&Currency::usd()), 1);
        assert_eq!(session.state().active_rate, dec!(0.9));
        assert_eq!(session.state().buy_amount.as_deref(), Some("90.00"));
        assert!(!session.currencies().contains(&Currency::gbp()));
    }

    #[tokio::test]
    async fn test_invalid_base_currency() {
        let (_, _, mut session) = setup();

        let result = session.set_base_currency("").await;

        assert!(matches!(result, Err(BookingError::Common(_))));
        assert_eq!(session.base_currency(), &Currency::eur());
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_no_rates() {
        let (provider, _, mut session) = setup();
        session.reload_rates().await.unwrap();
        fill_usd_eur(&mut session, "500");
        session.take_notifications();

        provider.set_failing(true);
        let result = session.reload_rates().await;

        assert!(matches!(result, Err(FxError::ProviderError(_))));
        assert_eq!(session.state().active_rate, Decimal::ZERO);
        assert_eq!(session.state().buy_amount.as_deref(), Some("425.00"));
        assert!(session.currencies().is_empty());

        let notifications = session.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].title, "Error fetching exchange rates");
        assert!(notifications[0].is_error());
    }

    #[tokio::test]
    async fn test_last_arrival_wins() {
        let (_, _, mut session) = setup();
        fill_usd_eur(&mut session, "100");

        session.apply_snapshot(Ok(eur_snapshot())).unwrap();
        session
            .apply_snapshot(Ok(RateSnapshot::new().with_rate("USD", "EUR", dec!(0.8))))
            .unwrap();

        assert_eq!(session.state().active_rate, dec!(0.8));
        assert_eq!(session.state().buy_amount.as_deref(), Some("80.00"));
        assert!(session.available_rates().iter().all(|r| r.currency != Currency::gbp()));
    }

    #[tokio::test]
    async fn test_available_rates() {
        let (_, _, mut session) = setup();
        assert!(session.available_rates().is_empty());

        session.reload_rates().await.unwrap();
        session.engine_mut().set_sell_currency(Currency::eur());

        assert_eq!(
            session.available_rates(),
            vec![
                AvailableRate { currency: Currency::gbp(), rate: dec!(0.88) },
                AvailableRate { currency: Currency::usd(), rate: dec!(1.18) },
            ]
        );
    }

    #[tokio::test]
    async fn test_submit_books_and_resets() {
        let (_, store, mut session) = setup();
        session.reload_rates().await.unwrap();
        fill_usd_eur(&mut session, "500");

        let booked = session.submit().await.unwrap();

        assert_eq!(booked.sell_amount, dec!(500));
        assert_eq!(booked.buy_amount, dec!(425));
        assert_eq!(booked.rate, dec!(0.85));
        assert!(session.state().is_empty());
        assert!(!session.is_submitting());
        assert_eq!(store.len(), 1);
        assert_eq!(session.booked_trades(), &[booked]);

        let notifications = session.take_notifications();
        assert_eq!(notifications, vec![Notification::success("Success", "Trade saved successfully!")]);
    }

    #[tokio::test]
    async fn test_submit_rejected_without_buy_amount() {
        let (_, store, mut session) = setup();
        session.reload_rates().await.unwrap();
        session.engine_mut().set_sell_currency(Currency::usd());
        session.engine_mut().set_buy_currency(Currency::eur());
        let before = session.state().clone();

        let result = session.submit().await;

        assert!(matches!(result, Err(BookingError::SubmissionRejected { .. })));
        assert_eq!(session.state(), &before);
        assert_eq!(store.submission_count(), 0);
        assert!(!session.is_submitting());

        let notifications = session.take_notifications();
        assert_eq!(notifications[0].message, "All fields must have a value.");
    }

    #[tokio::test]
    async fn test_resubmission_blocked_while_in_flight() {
        let (_, store, mut session) = setup();
        session.reload_rates().await.unwrap();
        fill_usd_eur(&mut session, "500");

        let pending = session.begin_submission().unwrap();
        assert!(session.is_submitting());

        // Edits stay possible while the call is pending.
        session.engine_mut().set_sell_amount("600");
        assert!(matches!(session.begin_submission(), Err(BookingError::SubmissionInFlight)));
        assert!(matches!(session.submit().await, Err(BookingError::SubmissionInFlight)));
        assert_eq!(store.submission_count(), 0);

        let result = store.submit(pending.trade()).await;
        session.finish_submission(pending, result).await.unwrap();

        assert!(!session.is_submitting());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_form() {
        let (_, store, mut session) = setup();
        session.reload_rates().await.unwrap();
        fill_usd_eur(&mut session, "500");
        store.set_fail_submit(true);

        let result = session.submit().await;

        assert!(matches!(result, Err(BookingError::StoreError(_))));
        assert_eq!(session.state().sell_amount.as_deref(), Some("500"));
        assert!(!session.is_submitting());

        let notifications = session.take_notifications();
        assert_eq!(notifications[0].title, "Error saving trade");
        assert_eq!(notifications[0].level, NotificationLevel::Error);

        store.set_fail_submit(false);
        assert!(session.submit().await.is_ok());
    }

    #[tokio::test]
    async fn test_trade_list_failure_keeps_previous_list() {
        let (_, store, mut session) = setup();
        session.reload_rates().await.unwrap();
        fill_usd_eur(&mut session, "500");
        session.submit().await.unwrap();
        session.take_notifications();

        store.set_fail_list(true);
        assert!(session.reload_trades().await.is_err());

        assert_eq!(session.booked_trades().len(), 1);
        assert_eq!(session.take_notifications()[0].title, "Error loading trades");
    }

    #[tokio::test]
    async fn test_trades_newest_first() {
        let (_, _, mut session) = setup();
        session.reload_rates().await.unwrap();
        for amount in ["100", "200", "300"] {
            fill_usd_eur(&mut session, amount);
            session.submit().await.unwrap();
        }

        let ordered = session.trades_newest_first();
        let delivered = session.booked_trades();

        assert_eq!(ordered.len(), 3);
        assert!(ordered.windows(2).all(|w| w[0].booked_at >= w[1].booked_at));
        assert_eq!(delivered[0].sell_amount, dec!(100));
    }

    #[tokio::test]
    async fn test_cancel_resets_form() {
        let (_, _, mut session) = setup();
        fill_usd_eur(&mut session, "500");

        session.cancel();

        assert!(session.state().is_empty());
    }

    /// Store whose submissions never answer in time.
    struct SlowTradeStore;

    #[async_trait]
    impl TradeStore for SlowTradeStore {
        async fn submit(&self, trade: &NewTrade) -> BookingResult<BookedTrade> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(trade.clone().into_booked(tradebook_common::TradeId::new()))
        }

        async fn list_trades(&self) -> BookingResult<Vec<BookedTrade>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_cancelled_submission_frees_form() {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_snapshot(Currency::eur(), eur_snapshot());
        let mut session =
            BookingSession::new(provider, Arc::new(SlowTradeStore), BookingConfig::default()).unwrap();
        session.reload_rates().await.unwrap();
        fill_usd_eur(&mut session, "500");

        let timed_out = tokio::time::timeout(Duration::from_millis(50), session.submit()).await;

        assert!(timed_out.is_err());
        assert!(!session.is_submitting());
        assert_eq!(session.state().buy_amount.as_deref(), Some("425.00"));

        let pending = session.begin_submission().unwrap();
        assert!(session.is_submitting());
        drop(pending);
        assert!(!session.is_submitting());
    }
}
