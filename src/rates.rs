use crate::errors::PricingError;
use crate::types::{CalculationMode, Currency, FeeConfig, RateConfig, ServiceType, TransportMode};
use async_trait::async_trait;
use std::sync::Arc;

/// Insurance fraction used when neither the rate nor the platform card has one.
pub const DEFAULT_INSURANCE_RATE: f64 = 0.05;
/// Every fabricated rate id starts with this.
pub const SYNTHETIC_ID_PREFIX: &str = "mock-";
pub const PLATFORM_FORWARDER_ID: &str = "platform";

#[async_trait]
pub trait FeeProvider: Send + Sync {
    /// All fee rows, active or not.
    async fn get_active_fees(&self) -> Result<Vec<FeeConfig>, PricingError>;
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn get_platform_rate(
        &self,
        mode: TransportMode,
        service_type: ServiceType,
    ) -> Result<Option<RateConfig>, PricingError>;

    /// `forwarder_id = None` means every forwarder.
    async fn get_forwarder_rates(
        &self,
        mode: TransportMode,
        service_type: ServiceType,
        forwarder_id: Option<&str>,
    ) -> Result<Vec<RateConfig>, PricingError>;
}

/// Stand-in rate cards for compare mode when no forwarder has published one.
pub trait FallbackRates: Send + Sync {
    fn fallback_rates(&self, mode: TransportMode, service_type: ServiceType) -> Vec<RateConfig>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRate {
    pub source_id: String,
    pub forwarder_id: String,
    pub source_name: String,
    pub price_per_unit: f64,
    pub insurance_rate: f64,
    pub transit_min: u32,
    pub transit_max: u32,
    pub currency: Currency,
    pub is_platform: bool,
    pub is_synthetic: bool,
}

pub struct RateResolver {
    rates: Arc<dyn RateProvider>,
    fallback: Option<Arc<dyn FallbackRates>>,
    platform_name: String,
}

impl RateResolver {
    pub fn new(rates: Arc<dyn RateProvider>) -> Self {
        Self {
            rates,
            fallback: None,
            platform_name: "Platform Rate".into(),
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackRates>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_platform_name(mut self, name: impl Into<String>) -> Self {
        self.platform_name = name.into();
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub async fn resolve(
        &self,
        mode: TransportMode,
        service_type: ServiceType,
        calculation_mode: CalculationMode,
        forwarder_id: Option<&str>,
    ) -> Result<Vec<ResolvedRate>, PricingError> {
        match calculation_mode {
            CalculationMode::Platform => {
                let rate = self.rates.get_platform_rate(mode, service_type).await?;
                Ok(rate.map(|rate| self.platform_rate(rate)).into_iter().collect())
            }
            CalculationMode::Specific => {
                let Some(forwarder_id) = forwarder_id.filter(|id| !id.trim().is_empty()) else {
                    tracing::warn!("specific calculation requested without forwarder_id");
                    return Ok(Vec::new());
                };
                let rows = self
                    .rates
                    .get_forwarder_rates(mode, service_type, Some(forwarder_id))
                    .await?;
                self.forwarder_rates(mode, service_type, rows, false).await
            }
            CalculationMode::Compare => {
                let rows = self.rates.get_forwarder_rates(mode, service_type, None).await?;
                if !rows.is_empty() {
                    return self.forwarder_rates(mode, service_type, rows, false).await;
                }
                match &self.fallback {
                    Some(fallback) => {
                        tracing::warn!(
                            mode = %mode,
                            service_type = %service_type,
                            "no forwarder rates published; using synthetic comparison set"
                        );
                        let rows = fallback.fallback_rates(mode, service_type);
                        self.forwarder_rates(mode, service_type, rows, true).await
                    }
                    None => Ok(Vec::new()),
                }
            }
        }
    }

    fn platform_rate(&self, rate: RateConfig) -> ResolvedRate {
        ResolvedRate {
            source_id: rate.id,
            forwarder_id: PLATFORM_FORWARDER_ID.into(),
            source_name: self.platform_name.clone(),
            price_per_unit: rate.price_per_unit,
            insurance_rate: rate.insurance_rate.unwrap_or(DEFAULT_INSURANCE_RATE),
            transit_min: rate.min_transit_days,
            transit_max: rate.max_transit_days,
            currency: rate.currency,
            is_platform: true,
            is_synthetic: false,
        }
    }

    async fn forwarder_rates(
        &self,
        mode: TransportMode,
        service_type: ServiceType,
        rows: Vec<RateConfig>,
        synthetic: bool,
    ) -> Result<Vec<ResolvedRate>, PricingError> {
        // The platform card is only consulted when some row lacks its own rate.
        let fallback_insurance = if rows.iter().any(|row| row.insurance_rate.is_none()) {
            self.rates
                .get_platform_rate(mode, service_type)
                .await?
                .and_then(|platform| platform.insurance_rate)
                .unwrap_or(DEFAULT_INSURANCE_RATE)
        } else {
            DEFAULT_INSURANCE_RATE
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let forwarder_id = row.forwarder_id.clone().unwrap_or_else(|| row.id.clone());
                let source_name = row
                    .forwarder_name
                    .clone()
                    .unwrap_or_else(|| forwarder_id.clone());
                ResolvedRate {
                    is_synthetic: synthetic || row.id.starts_with(SYNTHETIC_ID_PREFIX),
                    source_id: row.id,
                    forwarder_id,
                    source_name,
                    price_per_unit: row.price_per_unit,
                    insurance_rate: row.insurance_rate.unwrap_or(fallback_insurance),
                    transit_min: row.min_transit_days,
                    transit_max: row.max_transit_days,
                    currency: row.currency,
                    is_platform: false,
                }
            })
            .collect())
    }
}

struct SyntheticProfile {
    slug: &'static str,
    name: &'static str,
    sea_price: f64,
    air_price: f64,
    sea_transit: (u32, u32),
    air_transit: (u32, u32),
    insurance_rate: f64,
}

const SYNTHETIC_PROFILES: [SyntheticProfile; 3] = [
    SyntheticProfile {
        slug: "oceanlink",
        name: "OceanLink Freight (example)",
        sea_price: 65.0,
        air_price: 4.5,
        sea_transit: (30, 40),
        air_transit: (7, 10),
        insurance_rate: 0.04,
    },
    SyntheticProfile {
        slug: "swiftcargo",
        name: "SwiftCargo Express (example)",
        sea_price: 95.0,
        air_price: 7.5,
        sea_transit: (18, 24),
        air_transit: (2, 4),
        insurance_rate: 0.06,
    },
    SyntheticProfile {
        slug: "greenroute",
        name: "GreenRoute Eco Logistics (example)",
        sea_price: 78.0,
        air_price: 5.8,
        sea_transit: (24, 32),
        air_transit: (4, 7),
        insurance_rate: 0.05,
    },
];

const EXPRESS_PRICE_FACTOR: f64 = 1.3;

/// Three example forwarders spread across cheap/slow, fast/expensive and a
/// middle option. Ids carry [`SYNTHETIC_ID_PREFIX`].
#[derive(Debug, Clone)]
pub struct SyntheticForwarders {
    currency: Currency,
}

impl SyntheticForwarders {
    pub fn new(currency: impl Into<Currency>) -> Self {
        Self {
            currency: currency.into(),
        }
    }
}

impl FallbackRates for SyntheticForwarders {
    fn fallback_rates(&self, mode: TransportMode, service_type: ServiceType) -> Vec<RateConfig> {
        SYNTHETIC_PROFILES
            .iter()
            .map(|profile| {
                let (price, (min_days, max_days)) = match mode {
                    TransportMode::Sea => (profile.sea_price, profile.sea_transit),
                    TransportMode::Air => (profile.air_price, profile.air_transit),
                };
                let (price, min_days, max_days) = match service_type {
                    ServiceType::Standard => (price, min_days, max_days),
                    ServiceType::Express => (
                        price * EXPRESS_PRICE_FACTOR,
                        shorten(min_days),
                        shorten(max_days),
                    ),
                };
                let forwarder_id = format!("{SYNTHETIC_ID_PREFIX}{}", profile.slug);
                RateConfig {
                    id: format!("{forwarder_id}-{mode}-{service_type}"),
                    forwarder_id: Some(forwarder_id),
                    forwarder_name: Some(profile.name.to_string()),
                    mode,
                    service_type,
                    origin: None,
                    destination: None,
                    price_per_unit: price,
                    insurance_rate: Some(profile.insurance_rate),
                    min_transit_days: min_days,
                    max_transit_days: max_days,
                    currency: self.currency.clone(),
                    unit: mode.billable_unit(),
                }
            })
            .collect()
    }
}

fn shorten(days: u32) -> u32 {
    (days * 7 / 10).max(1)
}
