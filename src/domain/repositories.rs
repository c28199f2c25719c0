use crate::domain::instrument::{Instrument, InstrumentSeed};
use crate::domain::news::{NewsDraft, NewsItem};
use crate::domain::price::{PriceRecord, PriceSnapshot};
use crate::domain::rating::Rating;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait InstrumentRepository: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Instrument>>;

    /// The full instrument universe, in stable creation order.
    async fn list_all(&self) -> Result<Vec<Instrument>>;

    /// Insert seed entries, skipping codes that already exist. Returns
    /// the number of newly created instruments.
    async fn seed(&self, entries: &[InstrumentSeed]) -> Result<usize>;

    /// Overwrite the narrative block. Written by external collaborators,
    /// never by the ingestion pipeline itself.
    async fn save_profile(
        &self,
        code: &str,
        description: &str,
        business: &str,
        keywords: &[String],
    ) -> Result<()>;
}

#[async_trait]
pub trait PriceRepository: Send + Sync {
    /// Insert-or-update keyed on (instrument, trade_date). Last write
    /// wins; at most one row per key ever exists.
    async fn upsert(&self, instrument_id: i64, snapshot: &PriceSnapshot) -> Result<()>;

    /// Full price history, ascending by trade date, ready for indicator
    /// computation.
    async fn history(&self, instrument_id: i64) -> Result<Vec<PriceRecord>>;
}

#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Indexed dedup lookup: natural identifier first, exact link as the
    /// fallback where identifiers were not derivable.
    async fn exists(&self, instrument_id: i64, natural_id: &str, link: &str) -> Result<bool>;

    async fn list_for_instrument(&self, instrument_id: i64) -> Result<Vec<NewsItem>>;

    /// Persist a batch of new items and the re-aggregated rating in one
    /// transaction: either all rows and the rating land, or none do.
    /// Returns (rows inserted, rating written).
    async fn insert_batch_and_rate(
        &self,
        instrument_id: i64,
        items: &[NewsDraft],
    ) -> Result<(usize, Option<Rating>)>;
}
