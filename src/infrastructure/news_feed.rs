//! RSS adapter for the external news search feed.
//!
//! The retry schedule here is part of the ingestion contract (fixed
//! attempt ceiling, growing backoff, empty result after exhaustion), so
//! this adapter uses a plain reqwest client with an explicit loop rather
//! than the retry middleware.

use crate::domain::news::FeedEntry;
use crate::domain::ports::NewsFeedSource;
use crate::infrastructure::http_client_factory::encode_query_component;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rss::Channel;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, error, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub struct RssNewsFeed {
    client: Client,
    /// Search endpoint, query appended URL-encoded.
    base_url: String,
    /// Locale tail appended verbatim after the query.
    locale_params: String,
    max_retries: u32,
}

impl RssNewsFeed {
    pub fn new(base_url: String, locale_params: String, max_retries: u32) -> Self {
        Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
            locale_params,
            max_retries: max_retries.max(1),
        }
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url,
            encode_query_component(query),
            self.locale_params
        )
    }

    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Feed request failed")?;
        if !response.status().is_success() {
            anyhow::bail!("Feed returned status {}", response.status());
        }
        let bytes = response.bytes().await.context("Failed to read feed body")?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl NewsFeedSource for RssNewsFeed {
    async fn fetch(&self, query: &str) -> Result<Vec<FeedEntry>> {
        let url = self.search_url(query);
        debug!("Fetching news feed: {url}");

        for attempt in 1..=self.max_retries {
            match self.fetch_document(&url).await {
                Ok(bytes) => {
                    return match Channel::read_from(Cursor::new(bytes)) {
                        Ok(channel) => Ok(map_channel(&channel)),
                        Err(e) => {
                            // Parse failure is terminal for this call.
                            error!("Failed to parse news feed for \"{query}\": {e}");
                            Ok(Vec::new())
                        }
                    };
                }
                Err(e) => {
                    warn!(
                        "Feed fetch failed (attempt {attempt}/{}) for \"{query}\": {e:#}",
                        self.max_retries
                    );
                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                    }
                }
            }
        }

        warn!("Giving up on feed for \"{query}\" after {} attempts", self.max_retries);
        Ok(Vec::new())
    }
}

fn map_channel(channel: &Channel) -> Vec<FeedEntry> {
    channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title().unwrap_or_default().trim().to_string();
            let link = item.link().unwrap_or_default().trim().to_string();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            Some(FeedEntry {
                title,
                link,
                source: item.source().map(|s| {
                    s.title
                        .clone()
                        .unwrap_or_else(|| s.url.clone())
                        .trim()
                        .to_string()
                }),
                summary: item.description().map(|d| d.to_string()),
            })
        })
        .collect()
}
