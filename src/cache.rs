use crate::errors::PricingError;
use crate::rates::{FeeProvider, RateProvider};
use crate::types::{FeeConfig, RateConfig, ServiceType, TransportMode};
use ahash::AHasher;
use async_trait::async_trait;
use moka::future::Cache;
use std::{hash::Hasher, sync::Arc, time::Duration};

const MAX_RATE_ENTRIES: u64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RateKey(pub u64);

impl RateKey {
    pub fn derive(
        scope: &str,
        mode: TransportMode,
        service_type: ServiceType,
        forwarder_id: Option<&str>,
    ) -> Self {
        let mut hasher = AHasher::default();
        hasher.write(scope.as_bytes());
        hasher.write(mode.as_str().as_bytes());
        hasher.write(service_type.as_str().as_bytes());
        match forwarder_id {
            Some(id) => {
                hasher.write_u8(1);
                hasher.write(id.as_bytes());
            }
            None => hasher.write_u8(0),
        }
        RateKey(hasher.finish())
    }
}

/// Keeps the fee list for `ttl_ms`. Failed reads are not cached.
#[derive(Clone)]
pub struct CachedFeeProvider {
    inner: Arc<dyn FeeProvider>,
    cache: Cache<(), Arc<Vec<FeeConfig>>>,
}

impl CachedFeeProvider {
    pub fn new(inner: Arc<dyn FeeProvider>, ttl_ms: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_millis(ttl_ms))
            .build();
        Self { inner, cache }
    }

    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl FeeProvider for CachedFeeProvider {
    async fn get_active_fees(&self) -> Result<Vec<FeeConfig>, PricingError> {
        if let Some(hit) = self.cache.get(&()).await {
            return Ok((*hit).clone());
        }
        let fees = self.inner.get_active_fees().await?;
        self.cache.insert((), Arc::new(fees.clone())).await;
        Ok(fees)
    }
}

#[derive(Clone)]
pub struct CachedRateProvider {
    inner: Arc<dyn RateProvider>,
    platform: Cache<RateKey, Arc<Option<RateConfig>>>,
    forwarder: Cache<RateKey, Arc<Vec<RateConfig>>>,
}

impl CachedRateProvider {
    pub fn new(inner: Arc<dyn RateProvider>, ttl_ms: u64) -> Self {
        let ttl = Duration::from_millis(ttl_ms);
        Self {
            inner,
            platform: Cache::builder()
                .max_capacity(MAX_RATE_ENTRIES)
                .time_to_live(ttl)
                .build(),
            forwarder: Cache::builder()
                .max_capacity(MAX_RATE_ENTRIES)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn invalidate(&self) {
        self.platform.invalidate_all();
        self.forwarder.invalidate_all();
    }
}

#[async_trait]
impl RateProvider for CachedRateProvider {
    async fn get_platform_rate(
        &self,
        mode: TransportMode,
        service_type: ServiceType,
    ) -> Result<Option<RateConfig>, PricingError> {
        let key = RateKey::derive("platform", mode, service_type, None);
        if let Some(hit) = self.platform.get(&key).await {
            return Ok((*hit).clone());
        }
        let rate = self.inner.get_platform_rate(mode, service_type).await?;
        self.platform.insert(key, Arc::new(rate.clone())).await;
        Ok(rate)
    }

    async fn get_forwarder_rates(
        &self,
        mode: TransportMode,
        service_type: ServiceType,
        forwarder_id: Option<&str>,
    ) -> Result<Vec<RateConfig>, PricingError> {
        let key = RateKey::derive("forwarder", mode, service_type, forwarder_id);
        if let Some(hit) = self.forwarder.get(&key).await {
            return Ok((*hit).clone());
        }
        let rates = self
            .inner
            .get_forwarder_rates(mode, service_type, forwarder_id)
            .await?;
        self.forwarder.insert(key, Arc::new(rates.clone())).await;
        Ok(rates)
    }
}
