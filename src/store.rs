use crate::config::parse_document;
use crate::errors::PricingError;
use crate::rates::{FeeProvider, RateProvider};
use crate::types::{FeeConfig, RateConfig, ServiceType, TransportMode};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RateBookDocument {
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub platform_rates: Vec<RateConfig>,
    #[serde(default)]
    pub forwarder_rates: Vec<RateConfig>,
    #[serde(default)]
    pub fees: Vec<FeeConfig>,
}

/// In-memory rate cards and fee rows loaded from a JSON or YAML document.
#[derive(Debug, Clone, Default)]
pub struct RateBook {
    doc: RateBookDocument,
}

impl RateBook {
    pub fn new(doc: RateBookDocument) -> Result<Self, PricingError> {
        validate(&doc)?;
        Ok(Self { doc })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PricingError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let doc = parse_document(&raw)
            .map_err(|err| PricingError::Document(format!("{}: {err:#}", path.display())))?;
        Self::new(doc)
    }

    pub fn parse(raw: &str) -> Result<Self, PricingError> {
        let doc = parse_document(raw).map_err(|err| PricingError::Document(format!("{err:#}")))?;
        Self::new(doc)
    }

    pub fn revision(&self) -> &str {
        &self.doc.revision
    }

    pub fn document(&self) -> &RateBookDocument {
        &self.doc
    }
}

fn validate(doc: &RateBookDocument) -> Result<(), PricingError> {
    for rate in doc.platform_rates.iter().chain(&doc.forwarder_rates) {
        if rate.unit != rate.mode.billable_unit() {
            return Err(PricingError::Document(format!(
                "rate {} bills {} freight per {}",
                rate.id,
                rate.mode,
                rate.unit.as_str()
            )));
        }
        if !rate.price_per_unit.is_finite() || rate.price_per_unit < 0.0 {
            return Err(PricingError::Document(format!(
                "rate {} has invalid price_per_unit {}",
                rate.id, rate.price_per_unit
            )));
        }
        if rate.min_transit_days > rate.max_transit_days {
            return Err(PricingError::Document(format!(
                "rate {} transit window {}-{} is inverted",
                rate.id, rate.min_transit_days, rate.max_transit_days
            )));
        }
        if let Some(insurance) = rate.insurance_rate {
            if !(0.0..=1.0).contains(&insurance) {
                return Err(PricingError::Document(format!(
                    "rate {} has invalid insurance_rate {insurance}",
                    rate.id
                )));
            }
        }
    }
    for fee in &doc.fees {
        if !fee.value.is_finite() || fee.value < 0.0 {
            return Err(PricingError::Document(format!(
                "fee {} has invalid value {}",
                fee.id.as_deref().or(fee.name.as_deref()).unwrap_or("<unnamed>"),
                fee.value
            )));
        }
    }
    for rate in &doc.forwarder_rates {
        if rate.forwarder_id.is_none() {
            return Err(PricingError::Document(format!(
                "forwarder rate {} has no forwarder_id",
                rate.id
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl FeeProvider for RateBook {
    async fn get_active_fees(&self) -> Result<Vec<FeeConfig>, PricingError> {
        Ok(self.doc.fees.clone())
    }
}

#[async_trait]
impl RateProvider for RateBook {
    async fn get_platform_rate(
        &self,
        mode: TransportMode,
        service_type: ServiceType,
    ) -> Result<Option<RateConfig>, PricingError> {
        Ok(self
            .doc
            .platform_rates
            .iter()
            .find(|rate| rate.mode == mode && rate.service_type == service_type)
            .cloned())
    }

    async fn get_forwarder_rates(
        &self,
        mode: TransportMode,
        service_type: ServiceType,
        forwarder_id: Option<&str>,
    ) -> Result<Vec<RateConfig>, PricingError> {
        Ok(self
            .doc
            .forwarder_rates
            .iter()
            .filter(|rate| rate.mode == mode && rate.service_type == service_type)
            .filter(|rate| match forwarder_id {
                Some(id) => rate.forwarder_id.as_deref() == Some(id),
                None => true,
            })
            .cloned()
            .collect())
    }
}
