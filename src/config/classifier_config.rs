//! Sentiment classifier configuration parsing from environment
//! variables.

use std::env;

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("CLASSIFIER_API_KEY").unwrap_or_default(),
            base_url: env::var("CLASSIFIER_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("CLASSIFIER_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        }
    }

    /// Without a key the pipeline runs with the disabled classifier
    /// (every verdict neutral) instead of a nullable client.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
