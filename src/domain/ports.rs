use crate::domain::news::{FeedEntry, SentimentVerdict};
use crate::domain::price::PriceSnapshot;
use anyhow::Result;
use async_trait::async_trait;

/// External daily price source.
///
/// Implementations contain their own transient-failure handling: a call
/// that exhausts retries, or returns a document that cannot be parsed,
/// resolves to `Ok(None)` rather than an error. `Err` is reserved for
/// conditions the batch driver should count as a hard failure.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the snapshot for one instrument code on one 8-digit date.
    /// `None` when the source has no record for that date.
    async fn fetch_snapshot(&self, code: &str, date: &str) -> Result<Option<PriceSnapshot>>;
}

/// External news feed, queried with free text.
///
/// Implementations retry transient fetch failures with backoff and give
/// up returning an empty list; a parse failure on a fetched document is
/// terminal for the call and also yields an empty list.
#[async_trait]
pub trait NewsFeedSource: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Vec<FeedEntry>>;
}

/// Sentiment classification capability. Consumed, not implemented, by
/// the pipeline core; the ingestion engine falls back to a neutral
/// verdict when a call fails.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(
        &self,
        instrument_name: &str,
        title: &str,
        summary: &str,
    ) -> Result<SentimentVerdict>;
}
