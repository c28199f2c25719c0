//! Configuration module for Tickerflow.
//!
//! Structured configuration loading from environment variables,
//! organized by concern: database, price source, news source, sentiment
//! classifier and call pacing.

mod classifier_config;
mod news_source_config;
mod pacing_config;
mod price_source_config;

pub use classifier_config::ClassifierConfig;
pub use news_source_config::NewsSourceConfig;
pub use pacing_config::PacingConfig;
pub use price_source_config::PriceSourceConfig;

use std::env;

/// Main application configuration, composed from the per-concern
/// sub-configs.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub price_source: PriceSourceConfig,
    pub news_source: NewsSourceConfig,
    pub classifier: ClassifierConfig,
    pub pacing: PacingConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://data/tickerflow.db".to_string()),
            price_source: PriceSourceConfig::from_env(),
            news_source: NewsSourceConfig::from_env(),
            classifier: ClassifierConfig::from_env(),
            pacing: PacingConfig::from_env(),
        }
    }
}
