//! News feed configuration parsing from environment variables.

use std::env;

#[derive(Debug, Clone)]
pub struct NewsSourceConfig {
    /// Search endpoint; the URL-encoded query is appended directly.
    pub base_url: String,
    /// Locale tail appended verbatim after the query.
    pub locale_params: String,
    /// Generic qualifying term appended to the instrument name when
    /// building the search query.
    pub query_qualifier: String,
    pub max_retries: u32,
}

impl NewsSourceConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("NEWS_FEED_BASE_URL")
                .unwrap_or_else(|_| "https://news.google.com/rss/search?q=".to_string()),
            locale_params: env::var("NEWS_FEED_LOCALE_PARAMS")
                .unwrap_or_else(|_| "&hl=ko&gl=KR&ceid=KR:ko".to_string()),
            query_qualifier: env::var("NEWS_QUERY_QUALIFIER")
                .unwrap_or_else(|_| "주식".to_string()),
            max_retries: env::var("NEWS_FEED_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }
}
