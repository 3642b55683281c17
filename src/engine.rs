use crate::cache::{CachedFeeProvider, CachedRateProvider};
use crate::config::PricingConfig;
use crate::currency::{self, CurrencyConverter, ExchangeTable};
use crate::errors::PricingError;
use crate::rates::{
    FallbackRates, FeeProvider, RateProvider, RateResolver, ResolvedRate, SyntheticForwarders,
};
use crate::reputation::{PlatformReputation, Reputation, SeededReputation};
use crate::surcharge::{ServiceFlags, SurchargeSchedule};
use crate::types::*;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Entry point of the pricing engine. Stateless between calls apart from the
/// shared, read-mostly exchange table.
pub struct QuoteEngine {
    fees: Arc<dyn FeeProvider>,
    resolver: RateResolver,
    converter: Arc<CurrencyConverter>,
    surcharges: SurchargeSchedule,
    unified_surcharges: bool,
    platform_reputation: Arc<dyn Reputation>,
    forwarder_reputation: Arc<dyn Reputation>,
}

/// Cost components of one quote, all in the same currency.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CostBreakdown {
    base: f64,
    insurance: f64,
    additional_services: f64,
    tax: f64,
}

impl CostBreakdown {
    fn convert(&self, table: &ExchangeTable, target: &str) -> Self {
        Self {
            base: currency::convert_with(table, self.base, target),
            insurance: currency::convert_with(table, self.insurance, target),
            additional_services: currency::convert_with(table, self.additional_services, target),
            tax: currency::convert_with(table, self.tax, target),
        }
    }

    fn total(&self) -> f64 {
        self.base + self.insurance + self.additional_services + self.tax
    }
}

impl QuoteEngine {
    /// Engine with built-in exchange table, default surcharges, the synthetic
    /// compare fallback and seeded reputation.
    pub fn new(fees: Arc<dyn FeeProvider>, rates: Arc<dyn RateProvider>) -> Self {
        Self::from_config(&PricingConfig::default(), fees, rates)
    }

    pub fn from_config(
        cfg: &PricingConfig,
        fees: Arc<dyn FeeProvider>,
        rates: Arc<dyn RateProvider>,
    ) -> Self {
        let mut resolver = RateResolver::new(rates).with_platform_name(cfg.platform_name.clone());
        if cfg.synthetic_fallback {
            resolver = resolver.with_fallback(Arc::new(SyntheticForwarders::new(
                cfg.base_currency.clone(),
            )));
        }
        Self {
            fees,
            resolver,
            converter: Arc::new(CurrencyConverter::new(cfg.exchange.clone())),
            surcharges: cfg.surcharges.clone(),
            unified_surcharges: cfg.unified_surcharges,
            platform_reputation: Arc::new(PlatformReputation::default()),
            forwarder_reputation: Arc::new(SeededReputation::new(cfg.reputation_seed)),
        }
    }

    /// Like [`QuoteEngine::from_config`], but puts both collaborators behind
    /// TTL caches when `cache_ttl_ms` is non-zero.
    pub fn bootstrap(
        cfg: &PricingConfig,
        fees: Arc<dyn FeeProvider>,
        rates: Arc<dyn RateProvider>,
    ) -> Self {
        if cfg.cache_ttl_ms == 0 {
            return Self::from_config(cfg, fees, rates);
        }
        Self::from_config(
            cfg,
            Arc::new(CachedFeeProvider::new(fees, cfg.cache_ttl_ms)),
            Arc::new(CachedRateProvider::new(rates, cfg.cache_ttl_ms)),
        )
    }

    pub fn with_converter(mut self, converter: Arc<CurrencyConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn with_surcharges(mut self, schedule: SurchargeSchedule) -> Self {
        self.surcharges = schedule;
        self
    }

    pub fn with_unified_surcharges(mut self, unified: bool) -> Self {
        self.unified_surcharges = unified;
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn FallbackRates>) -> Self {
        self.resolver = self.resolver.with_fallback(fallback);
        self
    }

    pub fn with_forwarder_reputation(mut self, reputation: Arc<dyn Reputation>) -> Self {
        self.forwarder_reputation = reputation;
        self
    }

    pub fn with_platform_reputation(mut self, reputation: Arc<dyn Reputation>) -> Self {
        self.platform_reputation = reputation;
        self
    }

    pub fn converter(&self) -> &Arc<CurrencyConverter> {
        &self.converter
    }

    pub fn surcharges(&self) -> &SurchargeSchedule {
        &self.surcharges
    }

    /// Prices `params` against every applicable rate card.
    ///
    /// Non-computable input (no billable quantity, no configured rate) yields
    /// an empty list. Collaborator failures are returned unchanged.
    pub async fn calculate_quotes(
        &self,
        params: &CalculationParams,
    ) -> Result<Vec<QuoteResult>, PricingError> {
        let calculation_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "calculate_quotes",
            %calculation_id,
            mode = %params.mode,
            service_type = %params.service_type,
            calculation_mode = params.calculation_mode.as_str(),
        );
        self.calculate(params).instrument(span).await
    }

    async fn calculate(&self, params: &CalculationParams) -> Result<Vec<QuoteResult>, PricingError> {
        let quantity = params.billable_quantity();
        if quantity <= 0.0 || !quantity.is_finite() {
            tracing::debug!(quantity, "billable quantity not positive; nothing to quote");
            return Ok(Vec::new());
        }

        let (fees, rates) = tokio::try_join!(
            self.fees.get_active_fees(),
            self.resolver.resolve(
                params.mode,
                params.service_type,
                params.calculation_mode,
                params.forwarder_id.as_deref(),
            ),
        )?;

        let tax_rate = fees
            .iter()
            .find_map(FeeConfig::tax_fraction)
            .unwrap_or(0.0);
        if rates.is_empty() {
            tracing::debug!("no rate cards matched");
            return Ok(Vec::new());
        }

        let table = self.converter.snapshot();
        let target = self.display_currency(&table, params.target_currency.as_deref());
        let selected = ServiceFlags::from(&params.additional_services);

        let mut quotes: Vec<QuoteResult> = rates
            .iter()
            .map(|rate| self.price(params, rate, quantity, tax_rate, selected, &table, &target))
            .collect();

        if params.calculation_mode == CalculationMode::Compare {
            quotes.sort_by(|a, b| a.total_cost.total_cmp(&b.total_cost));
        }

        tracing::debug!(quotes = quotes.len(), tax_rate, currency = %target, "quotes priced");
        Ok(quotes)
    }

    #[allow(clippy::too_many_arguments)]
    fn price(
        &self,
        params: &CalculationParams,
        rate: &ResolvedRate,
        quantity: f64,
        tax_rate: f64,
        selected: ServiceFlags,
        table: &ExchangeTable,
        target: &str,
    ) -> QuoteResult {
        let unit_price = self.unit_price_in_base(rate, table);
        let services = if self.unified_surcharges || rate.is_platform {
            selected
        } else {
            selected - ServiceFlags::PLATFORM_ONLY
        };

        let base = quantity * unit_price;
        let insurance = base * rate.insurance_rate;
        let additional_services = self.surcharges.compute(services, params.cargo_value);
        let tax = (base + insurance + additional_services) * tax_rate;

        let costs = CostBreakdown {
            base,
            insurance,
            additional_services,
            tax,
        }
        .convert(table, target);

        let proof = if rate.is_platform {
            self.platform_reputation.social_proof(&rate.forwarder_id)
        } else {
            self.forwarder_reputation.social_proof(&rate.forwarder_id)
        };

        QuoteResult {
            id: rate.source_id.clone(),
            forwarder_id: rate.forwarder_id.clone(),
            forwarder_name: rate.source_name.clone(),
            mode: params.mode,
            service_type: params.service_type,
            is_platform_rate: rate.is_platform,
            is_synthetic: rate.is_synthetic,
            base_cost: costs.base,
            insurance_cost: costs.insurance,
            additional_services_cost: costs.additional_services,
            tax_cost: costs.tax,
            total_cost: costs.total(),
            transit_time: format!("{}-{} days", rate.transit_min, rate.transit_max),
            price_per_unit: currency::convert_with(table, unit_price, target),
            unit: params.mode.billable_unit(),
            currency: target.to_string(),
            rating: proof.rating,
            review_count: proof.review_count,
        }
    }

    fn unit_price_in_base(&self, rate: &ResolvedRate, table: &ExchangeTable) -> f64 {
        if rate.currency.eq_ignore_ascii_case(&table.base) {
            return rate.price_per_unit;
        }
        if !currency::is_known(table, &rate.currency) {
            tracing::warn!(
                rate_id = %rate.source_id,
                currency = %rate.currency,
                "rate currency missing from exchange table; treating price as base currency"
            );
        }
        currency::to_base_with(table, rate.price_per_unit, &rate.currency)
    }

    /// Currency the quote amounts are actually expressed in. An unknown
    /// request code converts at rate 1, so the result is labelled as base.
    fn display_currency(&self, table: &ExchangeTable, requested: Option<&str>) -> Currency {
        match requested.map(str::trim).filter(|code| !code.is_empty()) {
            Some(code) if currency::is_known(table, code) => code.to_ascii_uppercase(),
            Some(code) => {
                tracing::warn!(requested = code, base = %table.base, "unsupported target currency");
                table.base.clone()
            }
            None => table.base.clone(),
        }
    }
}
