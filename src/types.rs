use serde::{Deserialize, Serialize};
use std::fmt;

pub type Currency = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Sea,
    Air,
}

impl TransportMode {
    /// Sea freight bills by volume, air freight by weight.
    pub fn billable_unit(&self) -> Unit {
        match self {
            TransportMode::Sea => Unit::Cbm,
            TransportMode::Air => Unit::Kg,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Sea => "sea",
            TransportMode::Air => "air",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Standard,
    Express,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Standard => "standard",
            ServiceType::Express => "express",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum CalculationMode {
    #[default]
    Platform,
    Compare,
    Specific,
}

impl CalculationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMode::Platform => "platform",
            CalculationMode::Compare => "compare",
            CalculationMode::Specific => "specific",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Cbm,
    Kg,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Cbm => "cbm",
            Unit::Kg => "kg",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AdditionalServices {
    #[serde(default)]
    pub insurance: bool,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub packaging: bool,
    #[serde(default)]
    pub inspection: bool,
    #[serde(default)]
    pub customs_clearance: bool,
    #[serde(default)]
    pub door_to_door: bool,
    #[serde(default)]
    pub storage: bool,
}

/// One pricing request as submitted by the quote form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationParams {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    pub mode: TransportMode,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub volume_cbm: Option<f64>,
    #[serde(default, rename = "cargoValue")]
    pub cargo_value: Option<f64>,
    #[serde(default, rename = "calculationMode")]
    pub calculation_mode: CalculationMode,
    #[serde(default)]
    pub forwarder_id: Option<String>,
    #[serde(default, rename = "targetCurrency")]
    pub target_currency: Option<Currency>,
    #[serde(default, rename = "additionalServices")]
    pub additional_services: AdditionalServices,
}

impl CalculationParams {
    pub fn new(mode: TransportMode, service_type: ServiceType) -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            mode,
            service_type,
            weight_kg: None,
            volume_cbm: None,
            cargo_value: None,
            calculation_mode: CalculationMode::Platform,
            forwarder_id: None,
            target_currency: None,
            additional_services: AdditionalServices::default(),
        }
    }

    /// Quantity multiplied by the unit price. Missing or NaN counts as zero.
    pub fn billable_quantity(&self) -> f64 {
        let raw = match self.mode.billable_unit() {
            Unit::Cbm => self.volume_cbm,
            Unit::Kg => self.weight_kg,
        };
        raw.filter(|value| !value.is_nan()).unwrap_or(0.0)
    }
}

/// A platform or forwarder rate card row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateConfig {
    pub id: String,
    #[serde(default)]
    pub forwarder_id: Option<String>,
    #[serde(default)]
    pub forwarder_name: Option<String>,
    pub mode: TransportMode,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    pub price_per_unit: f64,
    #[serde(default)]
    pub insurance_rate: Option<f64>,
    pub min_transit_days: u32,
    pub max_transit_days: u32,
    pub currency: Currency,
    pub unit: Unit,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeeCategory {
    Tax,
    Platform,
    Service,
    Payment,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeeKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeeConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub category: FeeCategory,
    #[serde(rename = "type")]
    pub kind: FeeKind,
    pub value: f64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl FeeConfig {
    /// Fraction applied to the pre-tax subtotal, if this row is the tax rate.
    pub fn tax_fraction(&self) -> Option<f64> {
        let applies = self.is_active
            && self.category == FeeCategory::Tax
            && self.kind == FeeKind::Percentage;
        applies.then(|| self.value / 100.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuoteResult {
    pub id: String,
    pub forwarder_id: String,
    pub forwarder_name: String,
    pub mode: TransportMode,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub is_platform_rate: bool,
    #[serde(default)]
    pub is_synthetic: bool,
    pub base_cost: f64,
    pub insurance_cost: f64,
    pub additional_services_cost: f64,
    pub tax_cost: f64,
    pub total_cost: f64,
    pub transit_time: String,
    pub price_per_unit: f64,
    pub unit: Unit,
    pub currency: Currency,
    pub rating: f32,
    pub review_count: u32,
}
