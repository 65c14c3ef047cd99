//! Rates-by-base snapshots as delivered by a rate provider.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tradebook_common::Currency;

use crate::error::FxResult;

/// Provider payload before currency codes are canonicalized.
type RawSnapshot = HashMap<String, HashMap<String, Decimal>>;

/// `{ base: { target: rate } }` where `amount(target) = amount(base) * rate`.
///
/// Codes are case-insensitive: `usd` and `USD` entries are merged into one
/// base, never one replacing the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSnapshot")]
pub struct RateSnapshot(HashMap<Currency, HashMap<Currency, Decimal>>);

impl From<RawSnapshot> for RateSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        let mut snapshot = Self::new();
        for (base, targets) in raw {
            let base = Currency::new(base);
            for (target, rate) in targets {
                snapshot.insert(base.clone(), Currency::new(target), rate);
            }
            // A base quoting nothing is still a known currency.
            snapshot.0.entry(base).or_default();
        }
        snapshot
    }
}

impl RateSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a snapshot from JSON such as `{"USD": {"EUR": 0.85}}`.
    pub fn from_json(json: &str) -> FxResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add or replace a single quoted rate.
    pub fn insert(&mut self, base: Currency, target: Currency, rate: Decimal) {
        self.0.entry(base).or_default().insert(target, rate);
    }

    /// Builder form of [`RateSnapshot::insert`].
    pub fn with_rate(mut self, base: impl Into<Currency>, target: impl Into<Currency>, rate: Decimal) -> Self {
        self.insert(base.into(), target.into(), rate);
        self
    }

    /// Base currencies the snapshot quotes from.
    pub fn base_currencies(&self) -> impl Iterator<Item = &Currency> {
        self.0.keys()
    }

    /// Iterate `(base, targets)` in delivery order.
    pub fn iter(&self) -> impl Iterator<Item = (&Currency, &HashMap<Currency, Decimal>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
