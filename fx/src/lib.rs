//! Tradebook FX
//!
//! Exchange-rate normalization for the trade booking core.
//!
//! # Features
//!
//! - Rates-by-base snapshots decoded from provider JSON
//! - Flat, directed `(from, to) -> rate` lookup with a derived currency set
//! - Pluggable asynchronous rate providers
//!
//! # Example
//!
//! ```rust,ignore
//! use tradebook_fx::{RateSnapshot, RateTable};
//! use tradebook_common::Currency;
//!
//! let snapshot = RateSnapshot::from_json(r#"{"USD": {"EUR": 0.85}}"#)?;
//! let table = RateTable::build(&snapshot);
//!
//! assert!(table.lookup(&Currency::usd(), &Currency::eur()).is_some());
//! assert!(table.lookup(&Currency::eur(), &Currency::usd()).is_none());
//! ```

pub mod error;
pub mod provider;
pub mod snapshot;
pub mod table;

pub use error::{FxError, FxResult};
pub use provider::{RateProvider, StaticRateProvider};
#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
pub use snapshot::RateSnapshot;
pub use table::{RateTable, SharedRateTable};
