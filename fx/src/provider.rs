//! Rate provider traits and implementations.

use async_trait::async_trait;
use tracing::debug;
use tradebook_common::Currency;

use crate::error::FxResult;
use crate::snapshot::RateSnapshot;

/// Source of rates-by-base snapshots.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch a snapshot of rates quoted relative to `base`.
    async fn fetch_snapshot(&self, base: &Currency) -> FxResult<RateSnapshot>;
}

/// Provider serving a fixed snapshot regardless of the requested base.
#[derive(Debug, Clone)]
pub struct StaticRateProvider {
    snapshot: RateSnapshot,
}

impl StaticRateProvider {
    /// Create a provider around a fixed snapshot.
    pub fn new(snapshot: RateSnapshot) -> Self {
        Self { snapshot }
    }

    /// Create a provider from JSON rates-by-base.
    pub fn from_json(json: &str) -> FxResult<Self> {
        Ok(Self::new(RateSnapshot::from_json(json)?))
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    fn name(&self) -> &str {
        "STATIC"
    }

    async fn fetch_snapshot(&self, base: &Currency) -> FxResult<RateSnapshot> {
        debug!(base = %base, "Serving static snapshot");
        Ok(self.snapshot.clone())
    }
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    snapshots: dashmap::DashMap<Currency, RateSnapshot>,
    requests: dashmap::DashMap<Currency, usize>,
    failing: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snapshots: dashmap::DashMap::new(),
            requests: dashmap::DashMap::new(),
            failing: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Set the snapshot served for a base currency.
    pub fn set_snapshot(&self, base: Currency, snapshot: RateSnapshot) {
        self.snapshots.insert(base, snapshot);
    }

    /// Make every subsequent fetch fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Number of fetches made for a base currency.
    pub fn request_count(&self, base: &Currency) -> usize {
        self.requests.get(base).map(|c| *c).unwrap_or(0)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_snapshot(&self, base: &Currency) -> FxResult<RateSnapshot> {
        *self.requests.entry(base.clone()).or_insert(0) += 1;

        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(crate::error::FxError::ProviderError(format!(
                "{} unavailable",
                self.name
            )));
        }

        self.snapshots
            .get(base)
            .map(|s| s.clone())
            .ok_or_else(|| crate::error::FxError::ProviderError(format!("no rates for base {}", base)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_static_provider_ignores_base() {
        let provider = StaticRateProvider::from_json(r#"{"EUR": {"USD": 1.18}}"#).unwrap();

        let snapshot = provider.fetch_snapshot(&Currency::gbp()).await.unwrap();

        assert_eq!(snapshot, RateSnapshot::new().with_rate("EUR", "USD", dec!(1.18)));
        assert_eq!(provider.name(), "STATIC");
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockRateProvider::new("test");
        let snapshot = RateSnapshot::new().with_rate("USD", "EUR", dec!(0.85));
        provider.set_snapshot(Currency::usd(), snapshot.clone());

        let result = provider.fetch_snapshot(&Currency::usd()).await.unwrap();

        assert_eq!(result, snapshot);
        assert_eq!(provider.request_count(&Currency::usd()), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_failure() {
        let provider = MockRateProvider::new("test");
        provider.set_snapshot(Currency::usd(), RateSnapshot::new());
        provider.set_failing(true);

        let result = provider.fetch_snapshot(&Currency::usd()).await;

        assert!(matches!(result, Err(FxError::ProviderError(_))));
        assert_eq!(provider.request_count(&Currency::usd()), 1);
    }

    #[test]
    fn test_static_provider_blocking() {
        let provider = StaticRateProvider::new(RateSnapshot::new());
        let snapshot = tokio_test::block_on(provider.fetch_snapshot(&Currency::eur())).unwrap();
        assert!(snapshot.is_empty());
    }
}
