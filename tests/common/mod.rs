#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tickerflow::application::news_ingestor::NewsIngestor;
use tickerflow::application::pacing::PacingGate;
use tickerflow::application::price_updater::PriceUpdater;
use tickerflow::application::CancelFlag;
use tickerflow::domain::instrument::InstrumentSeed;
use tickerflow::domain::news::{FeedEntry, SentimentLabel, SentimentVerdict};
use tickerflow::domain::ports::{NewsFeedSource, PriceSource, SentimentClassifier};
use tickerflow::domain::price::PriceSnapshot;
use tickerflow::domain::repositories::InstrumentRepository;
use tickerflow::infrastructure::persistence::database::Database;
use tickerflow::infrastructure::persistence::repositories::{
    SqliteInstrumentRepository, SqliteNewsRepository, SqlitePriceRepository,
};

pub async fn test_db() -> Database {
    Database::in_memory().await.expect("in-memory database")
}

pub async fn seed_instruments(db: &Database, entries: &[(&str, &str)]) {
    let repo = SqliteInstrumentRepository::new(db.pool.clone());
    let seeds: Vec<InstrumentSeed> = entries
        .iter()
        .map(|(code, name)| InstrumentSeed {
            code: code.to_string(),
            name: name.to_string(),
            category: None,
        })
        .collect();
    repo.seed(&seeds).await.expect("seed instruments");
}

pub fn snapshot(date: &str, close: i64) -> PriceSnapshot {
    PriceSnapshot {
        trade_date: date.to_string(),
        close: Some(close),
        open: Some(close - 100),
        high: Some(close + 200),
        low: Some(close - 300),
        change: Some(50),
        change_rate: Some(0.07),
        volume: Some(1_000_000),
        traded_value: Some(close * 1_000_000),
        listed_shares: Some(5_000_000),
        market_cap: Some(close * 5_000_000),
        market_segment: Some("KOSPI".to_string()),
        isin: Some("KR0000000001".to_string()),
    }
}

pub fn entry(title: &str, link: &str) -> FeedEntry {
    FeedEntry {
        title: title.to_string(),
        link: link.to_string(),
        source: Some("Test Wire".to_string()),
        summary: None,
    }
}

#[derive(Clone)]
pub enum PriceBehavior {
    Snapshot(PriceSnapshot),
    Empty,
    Fail,
}

/// Price source scripted per instrument code; ignores the requested
/// date.
pub struct ScriptedPriceSource {
    behaviors: Mutex<HashMap<String, PriceBehavior>>,
    pub calls: AtomicUsize,
}

impl ScriptedPriceSource {
    pub fn new() -> Self {
        Self {
            behaviors: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn script(&self, code: &str, behavior: PriceBehavior) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(code.to_string(), behavior);
    }
}

#[async_trait]
impl PriceSource for ScriptedPriceSource {
    async fn fetch_snapshot(&self, code: &str, _date: &str) -> Result<Option<PriceSnapshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behaviors.lock().unwrap().get(code).cloned();
        match behavior {
            Some(PriceBehavior::Snapshot(snapshot)) => Ok(Some(snapshot)),
            Some(PriceBehavior::Fail) => Err(anyhow!("simulated source outage")),
            Some(PriceBehavior::Empty) | None => Ok(None),
        }
    }
}

/// Feed that always returns the same entries.
pub struct StaticFeed {
    entries: Mutex<Vec<FeedEntry>>,
}

impl StaticFeed {
    pub fn new(entries: Vec<FeedEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn replace(&self, entries: Vec<FeedEntry>) {
        *self.entries.lock().unwrap() = entries;
    }
}

#[async_trait]
impl NewsFeedSource for StaticFeed {
    async fn fetch(&self, _query: &str) -> Result<Vec<FeedEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }
}

/// Classifier scripted per title; unknown titles get a neutral verdict.
pub struct ScriptedClassifier {
    verdicts: Mutex<HashMap<String, SentimentVerdict>>,
    pub calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self {
            verdicts: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn script(&self, title: &str, label: SentimentLabel, score: f64) {
        self.verdicts
            .lock()
            .unwrap()
            .insert(title.to_string(), SentimentVerdict { label, score });
    }
}

#[async_trait]
impl SentimentClassifier for ScriptedClassifier {
    async fn classify(&self, _name: &str, title: &str, _summary: &str) -> Result<SentimentVerdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let verdict = self.verdicts.lock().unwrap().get(title).cloned();
        Ok(verdict.unwrap_or_else(SentimentVerdict::neutral_fallback))
    }
}

pub struct FailingClassifier;

#[async_trait]
impl SentimentClassifier for FailingClassifier {
    async fn classify(&self, _: &str, _: &str, _: &str) -> Result<SentimentVerdict> {
        Err(anyhow!("classifier unavailable"))
    }
}

pub fn price_updater(db: &Database, source: Arc<dyn PriceSource>) -> PriceUpdater {
    price_updater_with_cancel(db, source, CancelFlag::new())
}

pub fn price_updater_with_cancel(
    db: &Database,
    source: Arc<dyn PriceSource>,
    cancel: CancelFlag,
) -> PriceUpdater {
    PriceUpdater::new(
        Arc::new(SqliteInstrumentRepository::new(db.pool.clone())),
        Arc::new(SqlitePriceRepository::new(db.pool.clone())),
        source,
        PacingGate::from_millis(0),
        cancel,
    )
}

pub fn news_ingestor(
    db: &Database,
    feed: Arc<dyn NewsFeedSource>,
    classifier: Arc<dyn SentimentClassifier>,
) -> NewsIngestor {
    NewsIngestor::new(
        Arc::new(SqliteInstrumentRepository::new(db.pool.clone())),
        Arc::new(SqliteNewsRepository::new(db.pool.clone())),
        feed,
        classifier,
        "주식".to_string(),
        PacingGate::from_millis(0),
        PacingGate::from_millis(0),
        CancelFlag::new(),
    )
}
