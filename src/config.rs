use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::{env, path::Path};

use crate::currency::{ExchangeTable, DEFAULT_BASE_CURRENCY};
use crate::surcharge::SurchargeSchedule;
use crate::types::Currency;

#[derive(Debug, Clone)]
pub struct PricingConfig {
    pub base_currency: Currency,
    pub exchange: ExchangeTable,
    pub surcharges: SurchargeSchedule,
    pub cache_ttl_ms: u64,
    pub synthetic_fallback: bool,
    pub unified_surcharges: bool,
    pub reputation_seed: u64,
    pub platform_name: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.into(),
            exchange: ExchangeTable::builtin(DEFAULT_BASE_CURRENCY),
            surcharges: SurchargeSchedule::default(),
            cache_ttl_ms: 30_000,
            synthetic_fallback: true,
            unified_surcharges: true,
            reputation_seed: 0,
            platform_name: "Platform Rate".into(),
        }
    }
}

impl PricingConfig {
    /// Loads `.env` if present, then reads the environment.
    pub fn from_dotenv() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        let base_currency = env::var("PRICING_BASE_CURRENCY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.into());

        let exchange = match env::var("PRICING_FX_PATH") {
            Ok(path) if !path.is_empty() => {
                let table: ExchangeTable = load_document(Path::new(&path))
                    .with_context(|| format!("load exchange table from {path}"))?;
                if !table.base.eq_ignore_ascii_case(&base_currency) {
                    bail!(
                        "exchange table base {} does not match PRICING_BASE_CURRENCY {}",
                        table.base,
                        base_currency
                    );
                }
                table
                    .validate()
                    .with_context(|| format!("validate exchange table from {path}"))?;
                tracing::info!(
                    path = %path,
                    as_of = %table.as_of,
                    currencies = table.rates.len(),
                    "loaded exchange table"
                );
                table
            }
            _ => ExchangeTable::builtin(&base_currency),
        };

        let surcharges = match env::var("PRICING_SURCHARGES_PATH") {
            Ok(path) if !path.is_empty() => {
                let schedule: SurchargeSchedule = load_document(Path::new(&path))
                    .with_context(|| format!("load surcharge schedule from {path}"))?;
                schedule
                    .validate()
                    .map_err(anyhow::Error::msg)
                    .context("validate surcharge schedule")?;
                schedule
            }
            _ => SurchargeSchedule::default(),
        };

        let cache_ttl_ms = env::var("PRICING_CACHE_TTL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30_000);
        let synthetic_fallback = env_flag("PRICING_SYNTHETIC_FALLBACK", true);
        let unified_surcharges = env_flag("PRICING_UNIFIED_SURCHARGES", true);
        let reputation_seed = env::var("PRICING_REPUTATION_SEED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let platform_name =
            env::var("PRICING_PLATFORM_NAME").unwrap_or_else(|_| "Platform Rate".into());

        if synthetic_fallback {
            tracing::info!("compare mode will fall back to synthetic example forwarders");
        }

        Ok(Self {
            base_currency,
            exchange,
            surcharges,
            cache_ttl_ms,
            synthetic_fallback,
            unified_surcharges,
            reputation_seed,
            platform_name,
        })
    }
}

/// Reads a JSON document, falling back to YAML.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
    parse_document(&raw).with_context(|| format!("parse {:?}", path))
}

pub fn parse_document<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let doc = serde_json::from_str(raw).or_else(|_| serde_yaml::from_str(raw))?;
    Ok(doc)
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            other => {
                tracing::warn!(key, value = other, "unrecognised boolean; using default");
                default
            }
        },
        Err(_) => default,
    }
}
