use crate::errors::PricingError;
use crate::types::Currency;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Multiplicative rates relative to `base`. The base itself always maps to 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangeTable {
    pub base: Currency,
    #[serde(default)]
    pub rates: HashMap<Currency, f64>,
    #[serde(default = "Utc::now")]
    pub as_of: DateTime<Utc>,
}

impl ExchangeTable {
    pub fn new(base: impl Into<Currency>, rates: HashMap<Currency, f64>) -> Self {
        Self {
            base: base.into(),
            rates,
            as_of: Utc::now(),
        }
        .normalized()
    }

    /// Static table shipped with the engine.
    pub fn builtin(base: &str) -> Self {
        let base = base.to_ascii_uppercase();
        if base != DEFAULT_BASE_CURRENCY {
            tracing::warn!(
                base = %base,
                "no built-in exchange table for base currency; only identity conversion available"
            );
            return Self::new(base, HashMap::new());
        }
        let rates = [
            ("USD", 1.0),
            ("EUR", 0.92),
            ("GBP", 0.79),
            ("CNY", 7.24),
            ("AED", 3.67),
            ("TRY", 32.5),
            ("XOF", 605.0),
            ("XAF", 605.0),
            ("NGN", 1550.0),
            ("GHS", 15.5),
            ("MAD", 10.0),
        ]
        .into_iter()
        .map(|(code, rate)| (code.to_string(), rate))
        .collect();
        Self::new(base, rates)
    }

    /// Every rate must be a finite, positive multiplier.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.base.trim().is_empty() {
            return Err(PricingError::Config("exchange table has no base currency".into()));
        }
        for (code, rate) in &self.rates {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(PricingError::Config(format!(
                    "exchange rate {code} = {rate} is not a positive number"
                )));
            }
        }
        Ok(())
    }

    /// Drops rates that [`ExchangeTable::validate`] would reject, so those
    /// codes convert as unknown instead of zeroing or flipping amounts.
    fn sanitized(mut self) -> Self {
        self.rates.retain(|code, rate| {
            let usable = rate.is_finite() && *rate > 0.0;
            if !usable {
                tracing::warn!(currency = %code, rate = *rate, "dropping unusable exchange rate");
            }
            usable
        });
        self
    }

    fn normalized(mut self) -> Self {
        self.base = self.base.to_ascii_uppercase();
        self.rates = self
            .rates
            .into_iter()
            .map(|(code, rate)| (code.to_ascii_uppercase(), rate))
            .collect();
        self.rates.insert(self.base.clone(), 1.0);
        self
    }

    fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_ascii_uppercase()).copied()
    }
}

/// Converts amounts out of (and back into) the base currency.
///
/// The table sits behind an [`ArcSwap`], so a live feed can call
/// [`CurrencyConverter::replace`] while calculations are in flight. A single
/// [`CurrencyConverter::snapshot`] should be used for all conversions that
/// belong to one quote.
pub struct CurrencyConverter {
    table: ArcSwap<ExchangeTable>,
}

impl CurrencyConverter {
    pub fn new(table: ExchangeTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table.sanitized().normalized()),
        }
    }

    pub fn builtin() -> Self {
        Self::new(ExchangeTable::builtin(DEFAULT_BASE_CURRENCY))
    }

    pub fn base_currency(&self) -> Currency {
        self.table.load().base.clone()
    }

    /// Swaps in a new table. A table that fails validation is rejected and the
    /// current one stays live.
    pub fn replace(&self, table: ExchangeTable) -> Result<(), PricingError> {
        if let Err(err) = table.validate() {
            tracing::warn!(base = %table.base, as_of = %table.as_of, error = %err, "exchange table rejected");
            return Err(err);
        }
        let table = table.normalized();
        tracing::info!(
            base = %table.base,
            as_of = %table.as_of,
            currencies = table.rates.len(),
            "exchange table replaced"
        );
        self.table.store(Arc::new(table));
        Ok(())
    }

    pub fn snapshot(&self) -> Arc<ExchangeTable> {
        self.table.load_full()
    }

    /// Unknown targets are treated as the base currency (rate 1).
    pub fn convert(&self, amount: f64, target: &str) -> f64 {
        convert_with(&self.table.load(), amount, target)
    }

    pub fn to_base(&self, amount: f64, source: &str) -> f64 {
        to_base_with(&self.table.load(), amount, source)
    }

    pub fn supports(&self, code: &str) -> bool {
        self.table.load().rate(code).is_some()
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::builtin()
    }
}

pub(crate) fn convert_with(table: &ExchangeTable, amount: f64, target: &str) -> f64 {
    amount * table.rate(target).unwrap_or(1.0)
}

pub(crate) fn to_base_with(table: &ExchangeTable, amount: f64, source: &str) -> f64 {
    match table.rate(source) {
        Some(rate) => amount / rate,
        None => amount,
    }
}

pub(crate) fn is_known(table: &ExchangeTable, code: &str) -> bool {
    table.rate(code).is_some()
}
