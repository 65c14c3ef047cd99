//! Flat, directed exchange-rate lookup built from provider snapshots.

use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};
use tradebook_common::{Currency, CurrencyPair};

use crate::snapshot::RateSnapshot;

/// Directed `(from, to) -> rate` table plus every currency seen in it.
///
/// Tables are immutable: a fresh snapshot replaces the whole table rather
/// than updating it in place. Inverse rates are never synthesized, so a
/// snapshot quoting only `USD -> EUR` cannot convert `EUR -> USD`.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<CurrencyPair, Decimal>,
    currencies: BTreeSet<Currency>,
}

impl RateTable {
    /// A table with no rates, used while rates are unavailable.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize a rates-by-base snapshot.
    ///
    /// Self-quotes (`base == target`) are ignored. Rates that are not
    /// strictly positive are dropped, but their currencies stay known.
    pub fn build(snapshot: &RateSnapshot) -> Self {
        let mut table = Self::empty();

        for (base, targets) in snapshot.iter() {
            table.currencies.insert(base.clone());

            for (target, rate) in targets {
                if target == base {
                    continue;
                }
                table.currencies.insert(target.clone());

                let pair = CurrencyPair::new(base.clone(), target.clone());
                if rate.is_sign_negative() || rate.is_zero() {
                    warn!(pair = %pair, rate = %rate, "Skipping non-positive rate");
                    continue;
                }
                table.rates.insert(pair, *rate);
            }
        }

        debug!(
            pairs = table.rates.len(),
            currencies = table.currencies.len(),
            "Built rate table"
        );

        table
    }

    /// Rate for `from -> to`, or `None` when the pair is not quoted.
    ///
    /// Converting a currency into itself is not a table entry and is
    /// also `None`.
    pub fn lookup(&self, from: &Currency, to: &Currency) -> Option<Decimal> {
        if from == to {
            return None;
        }
        self.rates
            .get(&CurrencyPair::new(from.clone(), to.clone()))
            .copied()
    }

    /// Lookup by pair.
    pub fn get(&self, pair: &CurrencyPair) -> Option<Decimal> {
        self.lookup(&pair.from, &pair.to)
    }

    /// Check if a pair is quoted.
    pub fn contains_pair(&self, pair: &CurrencyPair) -> bool {
        self.get(pair).is_some()
    }

    /// Every `(to, rate)` quoted from `from`. Order is unspecified and the
    /// sequence is recomputed on each call.
    pub fn rates_for<'a>(&'a self, from: &'a Currency) -> impl Iterator<Item = (&'a Currency, Decimal)> + 'a {
        self.rates
            .iter()
            .filter(move |(pair, _)| &pair.from == from)
            .map(|(pair, rate)| (&pair.to, *rate))
    }

    /// All currencies appearing as either side of a quote, sorted by code.
    pub fn currencies(&self) -> &BTreeSet<Currency> {
        &self.currencies
    }

    /// Number of directed pairs.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl From<&RateSnapshot> for RateTable {
    fn from(snapshot: &RateSnapshot) -> Self {
        Self::build(snapshot)
    }
}

/// Shared, immutable rate table.
pub type SharedRateTable = Arc<RateTable>;
