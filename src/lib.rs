pub mod cache;
pub mod config;
pub mod currency;
pub mod engine;
pub mod errors;
pub mod rates;
pub mod reputation;
pub mod store;
pub mod surcharge;
pub mod telemetry;
pub mod types;

pub use engine::QuoteEngine;
pub use errors::PricingError;
pub use types::{CalculationParams, QuoteResult};
