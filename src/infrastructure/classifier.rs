//! Sentiment classification adapters.
//!
//! The HTTP implementation talks to a chat-completion endpoint and asks
//! for a strict JSON verdict. Responses that are malformed or outside
//! the label enum are coerced to the neutral fallback rather than
//! surfaced, per the classifier contract. `DisabledClassifier` is the
//! explicit no-key variant: always neutral, never a network call.

use crate::domain::news::{SentimentLabel, SentimentVerdict};
use crate::domain::ports::SentimentClassifier;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

pub struct ChatCompletionClassifier {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionClassifier {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            api_key,
            model,
        }
    }

    fn prompt(instrument_name: &str, title: &str, summary: &str) -> String {
        let mut prompt = format!(
            "Classify the sentiment of this news item about the stock '{instrument_name}' \
             from an investor's point of view.\n\nHeadline: {title}\n"
        );
        if !summary.is_empty() {
            prompt.push_str(&format!("Summary: {summary}\n"));
        }
        prompt.push_str(
            "\nRespond with only a JSON object: \
             {\"sentiment\": \"POSITIVE\"|\"NEGATIVE\"|\"NEUTRAL\", \"score\": 0.0-1.0}",
        );
        prompt
    }
}

#[async_trait]
impl SentimentClassifier for ChatCompletionClassifier {
    async fn classify(
        &self,
        instrument_name: &str,
        title: &str,
        summary: &str,
    ) -> Result<SentimentVerdict> {
        let request = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are an equity research assistant. Answer with strict JSON only."},
                {"role": "user", "content": Self::prompt(instrument_name, title, summary)}
            ],
            "max_tokens": 60,
            "temperature": 0.0
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Classifier request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("Classifier returned status {}", response.status());
        }

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to parse classifier response")?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .unwrap_or_default();

        Ok(parse_verdict(content))
    }
}

/// Coerce the model's reply into a verdict. Anything that is not a
/// well-formed in-enum verdict becomes the neutral fallback.
fn parse_verdict(content: &str) -> SentimentVerdict {
    let parsed: RawVerdict = match serde_json::from_str(strip_code_fence(content)) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Unparseable classifier verdict ({e}): {content}");
            return SentimentVerdict::neutral_fallback();
        }
    };

    let Some(label) = SentimentLabel::parse(&parsed.sentiment) else {
        warn!("Out-of-enum sentiment label: {}", parsed.sentiment);
        return SentimentVerdict::neutral_fallback();
    };

    SentimentVerdict {
        label,
        score: parsed.score.unwrap_or(0.5).clamp(0.0, 1.0),
    }
}

/// Models often wrap JSON in a markdown fence despite instructions.
fn strip_code_fence(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    sentiment: String,
    score: Option<f64>,
}

/// No-op classifier used when no API key is configured.
pub struct DisabledClassifier;

#[async_trait]
impl SentimentClassifier for DisabledClassifier {
    async fn classify(&self, _: &str, _: &str, _: &str) -> Result<SentimentVerdict> {
        Ok(SentimentVerdict::neutral_fallback())
    }
}
