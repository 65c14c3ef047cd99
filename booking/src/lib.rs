//! Tradebook Booking
//!
//! The core of the currency trade booking form: a conversion engine that
//! derives the sell or buy amount from the active rate, and a session that
//! applies provider snapshots, submits trades and keeps the booked-trades
//! list current.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tradebook_booking::{BookingConfig, BookingSession, InMemoryTradeStore};
//! use tradebook_common::Currency;
//! use tradebook_fx::StaticRateProvider;
//!
//! let provider = Arc::new(StaticRateProvider::from_json(r#"{"USD": {"EUR": 0.85}}"#)?);
//! let store = Arc::new(InMemoryTradeStore::new());
//! let mut session = BookingSession::new(provider, store, BookingConfig::default())?;
//! session.reload_rates().await?;
//!
//! let engine = session.engine_mut();
//! engine.set_sell_currency(Currency::usd());
//! engine.set_buy_currency(Currency::eur());
//! engine.set_sell_amount("500");
//! assert_eq!(session.state().buy_amount.as_deref(), Some("425.00"));
//!
//! let booked = session.submit().await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod notification;
pub mod session;
pub mod state;
pub mod store;

pub use config::BookingConfig;
pub use engine::ConversionEngine;
pub use error::{BookingError, BookingResult, TradeField};
pub use notification::{Notification, NotificationLevel};
pub use session::{AvailableRate, BookingSession, PendingSubmission};
pub use state::{ConversionState, EditedField};
pub use store::{InMemoryTradeStore, TradeStore};
