//! Price source configuration parsing from environment variables.

use std::env;

#[derive(Debug, Clone)]
pub struct PriceSourceConfig {
    pub base_url: String,
    /// Issued pre-encoded by the provider; appended to URLs verbatim.
    pub service_key: String,
}

impl PriceSourceConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("PRICE_API_BASE_URL").unwrap_or_else(|_| {
                "https://apis.data.go.kr/1160100/service/GetStockSecuritiesInfoService".to_string()
            }),
            service_key: env::var("PRICE_API_KEY").unwrap_or_default(),
        }
    }
}
