//! News ingestion, dedup and sentiment classification.
//!
//! Fetches a feed per instrument, cleans and deduplicates candidates
//! against the stored history (natural identifier first, exact link as
//! fallback), classifies each accepted item, and persists the batch
//! together with the re-aggregated rating in one transaction.

use crate::application::pacing::PacingGate;
use crate::application::{BatchReport, CancelFlag};
use crate::domain::errors::PipelineError;
use crate::domain::instrument::Instrument;
use crate::domain::news::{self, NewsDraft, SentimentVerdict};
use crate::domain::ports::{NewsFeedSource, SentimentClassifier};
use crate::domain::repositories::{InstrumentRepository, NewsRepository};
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Source label recorded when the feed omits one.
const DEFAULT_SOURCE_LABEL: &str = "뉴스 피드";

pub struct NewsIngestor {
    instruments: Arc<dyn InstrumentRepository>,
    news: Arc<dyn NewsRepository>,
    feed: Arc<dyn NewsFeedSource>,
    classifier: Arc<dyn SentimentClassifier>,
    /// Qualifier appended to the display name when building the search
    /// query, e.g. a generic "stock" term in the feed's locale.
    query_qualifier: String,
    classifier_gate: PacingGate,
    instrument_gate: PacingGate,
    cancel: CancelFlag,
}

impl NewsIngestor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        instruments: Arc<dyn InstrumentRepository>,
        news: Arc<dyn NewsRepository>,
        feed: Arc<dyn NewsFeedSource>,
        classifier: Arc<dyn SentimentClassifier>,
        query_qualifier: String,
        classifier_gate: PacingGate,
        instrument_gate: PacingGate,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            instruments,
            news,
            feed,
            classifier,
            query_qualifier,
            classifier_gate,
            instrument_gate,
            cancel,
        }
    }

    /// Ingest up to `max_items` new items for one instrument. Returns the
    /// number of newly persisted items; an unknown code surfaces as
    /// [`PipelineError::InstrumentNotFound`].
    pub async fn ingest_one(&self, code: &str, max_items: usize) -> Result<usize> {
        let instrument = self
            .instruments
            .find_by_code(code)
            .await?
            .ok_or_else(|| PipelineError::InstrumentNotFound {
                code: code.to_string(),
            })?;
        self.ingest_instrument(&instrument, max_items).await
    }

    async fn ingest_instrument(&self, instrument: &Instrument, max_items: usize) -> Result<usize> {
        let query = if self.query_qualifier.is_empty() {
            instrument.name.clone()
        } else {
            format!("{} {}", instrument.name, self.query_qualifier)
        };
        let entries = self.feed.fetch(&query).await?;
        if entries.is_empty() {
            info!("{}: feed returned no items", instrument.name);
            return Ok(0);
        }
        info!("{}: {} feed items parsed", instrument.name, entries.len());

        let mut drafts: Vec<NewsDraft> = Vec::new();
        for entry in entries {
            if drafts.len() >= max_items {
                break;
            }

            let title = news::clean_text(&entry.title);
            let link = entry.link.trim().to_string();
            if title.is_empty() || link.is_empty() {
                continue;
            }

            let natural_id = news::natural_id_for(&link, &title);
            if drafts.iter().any(|d| d.natural_id == natural_id) {
                continue;
            }
            if self.news.exists(instrument.id, &natural_id, &link).await? {
                continue;
            }

            let summary = entry
                .summary
                .as_deref()
                .map(news::clean_text)
                .unwrap_or_default();

            self.classifier_gate.pace().await;
            let verdict = match self
                .classifier
                .classify(&instrument.name, &title, &summary)
                .await
            {
                Ok(verdict) => verdict,
                Err(e) => {
                    warn!(
                        "Sentiment classification failed for \"{title}\": {e:#}; using neutral fallback"
                    );
                    SentimentVerdict::neutral_fallback()
                }
            };
            info!(
                "{}: {} ({:.2}) - {}",
                instrument.name,
                verdict.label,
                verdict.score,
                truncate_for_log(&title)
            );

            drafts.push(NewsDraft {
                natural_id,
                title,
                summary,
                link,
                source: entry
                    .source
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SOURCE_LABEL.to_string()),
                sentiment: verdict.label,
                sentiment_score: verdict.score.clamp(0.0, 1.0),
            });
        }

        if drafts.is_empty() {
            info!("{}: no new items, rating left untouched", instrument.name);
            return Ok(0);
        }

        let (inserted, rating) = self
            .news
            .insert_batch_and_rate(instrument.id, &drafts)
            .await?;
        if let Some(rating) = &rating {
            info!(
                "{}: {} new items, rating {} ({})",
                instrument.name, inserted, rating.label, rating.reason
            );
        }
        Ok(inserted)
    }

    /// Ingest the whole universe sequentially, pacing between
    /// instruments and containing per-instrument failures.
    pub async fn ingest_all(&self, max_items: usize) -> Result<BatchReport> {
        let instruments = self.instruments.list_all().await?;
        let total = instruments.len();
        info!("Ingesting news for {total} instruments");

        let mut report = BatchReport::default();
        for (i, instrument) in instruments.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("News ingestion cancelled after {} of {total} instruments", i);
                break;
            }
            self.instrument_gate.pace().await;

            match self.ingest_instrument(instrument, max_items).await {
                Ok(count) => {
                    report.succeeded += 1;
                    info!(
                        "[{}/{total}] {} ingested ({count} new items)",
                        i + 1,
                        instrument.name
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        "[{}/{total}] {} ingestion failed: {e:#}",
                        i + 1,
                        instrument.name
                    );
                }
            }
        }

        info!(
            "News ingestion finished. succeeded: {}, failed: {}",
            report.succeeded, report.failed
        );
        Ok(report)
    }
}

fn truncate_for_log(title: &str) -> String {
    title.chars().take(30).collect()
}
