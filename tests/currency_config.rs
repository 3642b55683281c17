use freight_pricing::config::{parse_document, PricingConfig};
use freight_pricing::currency::{CurrencyConverter, ExchangeTable};
use freight_pricing::errors::ErrorCode;
use freight_pricing::surcharge::{ServiceFlags, SurchargeSchedule};
use freight_pricing::telemetry;
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn base_currency_conversion_is_identity() {
    let converter = CurrencyConverter::builtin();
    for amount in [0.0, 1.0, 198.24, -12.5, 1e9] {
        assert_eq!(converter.convert(amount, "USD"), amount);
        assert_eq!(converter.convert(amount, "usd"), amount);
    }
}

#[test]
fn unknown_currency_converts_at_rate_one() {
    let converter = CurrencyConverter::builtin();
    assert_eq!(converter.convert(42.0, "ZZZ"), 42.0);
    assert_eq!(converter.to_base(42.0, "ZZZ"), 42.0);
    assert!(!converter.supports("ZZZ"));
    assert!(converter.supports("xof"));
}

#[test]
fn to_base_inverts_convert() {
    let converter = CurrencyConverter::builtin();
    let eur = converter.convert(100.0, "EUR");
    assert!((eur - 92.0).abs() < 1e-9);
    assert!((converter.to_base(eur, "EUR") - 100.0).abs() < 1e-9);
}

#[test]
fn replacing_the_table_takes_effect_atomically() {
    let converter = Arc::new(CurrencyConverter::builtin());
    let before = converter.snapshot();

    let mut rates = HashMap::new();
    rates.insert("eur".to_string(), 0.5);
    converter
        .replace(ExchangeTable::new("USD", rates))
        .expect("valid table");

    assert_eq!(converter.convert(10.0, "EUR"), 5.0);
    assert_eq!(converter.convert(10.0, "GBP"), 10.0);
    assert_eq!(converter.base_currency(), "USD");
    // Snapshots taken earlier keep the old rates.
    assert_eq!(before.rates.get("EUR"), Some(&0.92));
}

#[test]
fn replace_rejects_zero_and_negative_rates() {
    let converter = CurrencyConverter::builtin();
    for bad in [0.0, -0.92, f64::NAN] {
        let rates = [("EUR".to_string(), bad)].into_iter().collect();
        let err = converter
            .replace(ExchangeTable::new("USD", rates))
            .expect_err("unusable rate");
        assert_eq!(err.code(), ErrorCode::ConfigInvalid);
    }
    assert_eq!(converter.convert(100.0, "EUR"), 92.0);
}

#[test]
fn converter_drops_unusable_rates_in_both_directions() {
    let rates = [("EUR".to_string(), 0.0), ("GBP".to_string(), 0.5)]
        .into_iter()
        .collect();
    let converter = CurrencyConverter::new(ExchangeTable::new("USD", rates));
    assert!(!converter.supports("EUR"));
    assert_eq!(converter.convert(100.0, "EUR"), 100.0);
    assert_eq!(converter.to_base(100.0, "EUR"), 100.0);
    assert_eq!(converter.convert(100.0, "GBP"), 50.0);
}

#[test]
fn surcharge_breakdown_lists_selected_services_in_order() {
    let schedule = SurchargeSchedule::default();
    let selected = ServiceFlags::all();
    let lines = schedule.breakdown(selected, Some(10_000.0));
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0].amount, 500.0);
    assert_eq!(schedule.compute(selected, Some(10_000.0)), 1375.0);
    assert_eq!(schedule.compute(ServiceFlags::empty(), Some(10_000.0)), 0.0);
    assert_eq!(schedule.compute(ServiceFlags::INSURANCE, Some(10.0)), 50.0);
}

#[test]
fn surcharge_schedule_parses_partial_yaml() {
    let schedule: SurchargeSchedule =
        parse_document("priority_fee: 99.5\nstorage_fee: 0\n").expect("parse schedule");
    assert_eq!(schedule.priority_fee, 99.5);
    assert_eq!(schedule.storage_fee, 0.0);
    assert_eq!(schedule.packaging_fee, SurchargeSchedule::default().packaging_fee);
}

// All environment handling lives in this one test so parallel tests never
// observe half-applied variables.
#[test]
fn config_reads_environment_and_documents() {
    telemetry::init_tracing("freight_pricing=debug");

    let defaults = PricingConfig::from_env().expect("defaults");
    assert_eq!(defaults.base_currency, "USD");
    assert_eq!(defaults.cache_ttl_ms, 30_000);
    assert!(defaults.synthetic_fallback);
    assert!(defaults.unified_surcharges);
    assert_eq!(defaults.surcharges, SurchargeSchedule::default());

    std::env::set_var("PRICING_FX_PATH", "configs/fx.json");
    std::env::set_var("PRICING_SURCHARGES_PATH", "configs/surcharges.yaml");
    std::env::set_var("PRICING_CACHE_TTL_MS", "1500");
    std::env::set_var("PRICING_SYNTHETIC_FALLBACK", "off");
    std::env::set_var("PRICING_UNIFIED_SURCHARGES", "false");
    std::env::set_var("PRICING_REPUTATION_SEED", "42");
    std::env::set_var("PRICING_PLATFORM_NAME", "House Card");

    let cfg = PricingConfig::from_env().expect("configured");
    assert_eq!(cfg.cache_ttl_ms, 1500);
    assert!(!cfg.synthetic_fallback);
    assert!(!cfg.unified_surcharges);
    assert_eq!(cfg.reputation_seed, 42);
    assert_eq!(cfg.platform_name, "House Card");
    assert_eq!(cfg.surcharges.insurance_minimum, 75.0);
    assert_eq!(cfg.surcharges.priority_fee, 120.0);
    assert_eq!(cfg.surcharges.packaging_fee, 75.0);

    let converter = CurrencyConverter::new(cfg.exchange.clone());
    assert_eq!(converter.convert(10.0, "EUR"), 9.0);
    assert_eq!(converter.convert(10.0, "GBP"), 10.0);

    let bad_fx = std::env::temp_dir().join(format!("freight-pricing-fx-{}.json", std::process::id()));
    std::fs::write(&bad_fx, r#"{"base": "USD", "rates": {"EUR": -0.9}}"#).expect("write fx");
    std::env::set_var("PRICING_FX_PATH", &bad_fx);
    let err = PricingConfig::from_env().expect_err("negative rate");
    assert!(format!("{err:#}").contains("EUR"));
    std::fs::remove_file(&bad_fx).ok();

    std::env::set_var("PRICING_FX_PATH", "configs/fx.json");
    std::env::set_var("PRICING_BASE_CURRENCY", "EUR");
    let err = PricingConfig::from_env().expect_err("base mismatch");
    assert!(err.to_string().contains("does not match"));

    for key in [
        "PRICING_BASE_CURRENCY",
        "PRICING_FX_PATH",
        "PRICING_SURCHARGES_PATH",
        "PRICING_CACHE_TTL_MS",
        "PRICING_SYNTHETIC_FALLBACK",
        "PRICING_UNIFIED_SURCHARGES",
        "PRICING_REPUTATION_SEED",
        "PRICING_PLATFORM_NAME",
    ] {
        std::env::remove_var(key);
    }
}
