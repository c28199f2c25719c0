use crate::domain::instrument::{Instrument, InstrumentSeed};
use crate::domain::news::{NewsDraft, NewsItem, SentimentLabel};
use crate::domain::price::{PriceRecord, PriceSnapshot};
use crate::domain::rating::{self, AGGREGATION_WINDOW, Rating, RatingLabel};
use crate::domain::repositories::{InstrumentRepository, NewsRepository, PriceRepository};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use tracing::debug;

pub struct SqliteInstrumentRepository {
    pool: SqlitePool,
}

impl SqliteInstrumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<Instrument> {
        let keywords = row
            .try_get::<Option<String>, _>("keywords_json")?
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default();

        let rating = match (
            row.try_get::<Option<String>, _>("rating")?,
            row.try_get::<Option<String>, _>("rating_reason")?,
        ) {
            (Some(label), reason) => RatingLabel::parse(&label).map(|label| Rating {
                label,
                reason: reason.unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Instrument {
            id: row.try_get("id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            business: row.try_get("business")?,
            keywords,
            rating,
        })
    }
}

#[async_trait]
impl InstrumentRepository for SqliteInstrumentRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<Instrument>> {
        let row = sqlx::query("SELECT * FROM instruments WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to look up instrument")?;
        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Instrument>> {
        let rows = sqlx::query("SELECT * FROM instruments ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list instruments")?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn seed(&self, entries: &[InstrumentSeed]) -> Result<usize> {
        let mut created = 0usize;
        for entry in entries {
            let result = sqlx::query(
                r#"
                INSERT INTO instruments (code, name, category)
                VALUES (?, ?, ?)
                ON CONFLICT(code) DO NOTHING
                "#,
            )
            .bind(&entry.code)
            .bind(&entry.name)
            .bind(&entry.category)
            .execute(&self.pool)
            .await
            .context("Failed to seed instrument")?;
            created += result.rows_affected() as usize;
        }
        Ok(created)
    }

    async fn save_profile(
        &self,
        code: &str,
        description: &str,
        business: &str,
        keywords: &[String],
    ) -> Result<()> {
        let keywords_json = serde_json::to_string(keywords)?;
        sqlx::query(
            r#"
            UPDATE instruments
            SET description = ?, business = ?, keywords_json = ?,
                updated_at = strftime('%s', 'now')
            WHERE code = ?
            "#,
        )
        .bind(description)
        .bind(business)
        .bind(keywords_json)
        .bind(code)
        .execute(&self.pool)
        .await
        .context("Failed to save instrument profile")?;
        Ok(())
    }
}

pub struct SqlitePriceRepository {
    pool: SqlitePool,
}

impl SqlitePriceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<PriceRecord> {
        Ok(PriceRecord {
            id: row.try_get("id")?,
            instrument_id: row.try_get("instrument_id")?,
            snapshot: PriceSnapshot {
                trade_date: row.try_get("trade_date")?,
                isin: row.try_get("isin")?,
                market_segment: row.try_get("market_segment")?,
                close: row.try_get("close")?,
                change: row.try_get("change_amount")?,
                change_rate: row.try_get("change_rate")?,
                open: row.try_get("open")?,
                high: row.try_get("high")?,
                low: row.try_get("low")?,
                volume: row.try_get("volume")?,
                traded_value: row.try_get("traded_value")?,
                listed_shares: row.try_get("listed_shares")?,
                market_cap: row.try_get("market_cap")?,
            },
        })
    }
}

#[async_trait]
impl PriceRepository for SqlitePriceRepository {
    async fn upsert(&self, instrument_id: i64, snapshot: &PriceSnapshot) -> Result<()> {
        // Single-statement merge: INSERT on first sight of the date,
        // field overwrite on every later run. Last write wins.
        sqlx::query(
            r#"
            INSERT INTO price_records (
                instrument_id, trade_date, close, change_amount, change_rate,
                open, high, low, volume, traded_value, listed_shares,
                market_cap, market_segment, isin
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(instrument_id, trade_date) DO UPDATE SET
                close = excluded.close,
                change_amount = excluded.change_amount,
                change_rate = excluded.change_rate,
                open = excluded.open,
                high = excluded.high,
                low = excluded.low,
                volume = excluded.volume,
                traded_value = excluded.traded_value,
                listed_shares = excluded.listed_shares,
                market_cap = excluded.market_cap,
                market_segment = excluded.market_segment,
                isin = excluded.isin,
                updated_at = strftime('%s', 'now')
            "#,
        )
        .bind(instrument_id)
        .bind(&snapshot.trade_date)
        .bind(snapshot.close)
        .bind(snapshot.change)
        .bind(snapshot.change_rate)
        .bind(snapshot.open)
        .bind(snapshot.high)
        .bind(snapshot.low)
        .bind(snapshot.volume)
        .bind(snapshot.traded_value)
        .bind(snapshot.listed_shares)
        .bind(snapshot.market_cap)
        .bind(&snapshot.market_segment)
        .bind(&snapshot.isin)
        .execute(&self.pool)
        .await
        .context("Failed to upsert price record")?;

        debug!("Upserted price for instrument {instrument_id} on {}", snapshot.trade_date);
        Ok(())
    }

    async fn history(&self, instrument_id: i64) -> Result<Vec<PriceRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM price_records WHERE instrument_id = ? ORDER BY trade_date ASC",
        )
        .bind(instrument_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load price history")?;
        rows.iter().map(Self::map_row).collect()
    }
}

pub struct SqliteNewsRepository {
    pool: SqlitePool,
}

impl SqliteNewsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::sqlite::SqliteRow) -> Result<NewsItem> {
        let sentiment_str: String = row.try_get("sentiment")?;
        Ok(NewsItem {
            id: row.try_get("id")?,
            instrument_id: row.try_get("instrument_id")?,
            natural_id: row.try_get("natural_id")?,
            title: row.try_get("title")?,
            summary: row.try_get("summary")?,
            link: row.try_get("link")?,
            source: row.try_get("source")?,
            sentiment: SentimentLabel::parse(&sentiment_str).unwrap_or(SentimentLabel::Neutral),
            sentiment_score: row.try_get("sentiment_score")?,
        })
    }
}

#[async_trait]
impl NewsRepository for SqliteNewsRepository {
    async fn exists(&self, instrument_id: i64, natural_id: &str, link: &str) -> Result<bool> {
        // Identifier-first policy; exact link only as the fallback.
        let by_id =
            sqlx::query("SELECT 1 FROM news_items WHERE instrument_id = ? AND natural_id = ? LIMIT 1")
                .bind(instrument_id)
                .bind(natural_id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed dedup lookup by natural id")?;
        if by_id.is_some() {
            return Ok(true);
        }
        if link.is_empty() {
            return Ok(false);
        }
        let by_link =
            sqlx::query("SELECT 1 FROM news_items WHERE instrument_id = ? AND link = ? LIMIT 1")
                .bind(instrument_id)
                .bind(link)
                .fetch_optional(&self.pool)
                .await
                .context("Failed dedup lookup by link")?;
        Ok(by_link.is_some())
    }

    async fn list_for_instrument(&self, instrument_id: i64) -> Result<Vec<NewsItem>> {
        let rows =
            sqlx::query("SELECT * FROM news_items WHERE instrument_id = ? ORDER BY id DESC")
                .bind(instrument_id)
                .fetch_all(&self.pool)
                .await
                .context("Failed to list news items")?;
        rows.iter().map(Self::map_row).collect()
    }

    async fn insert_batch_and_rate(
        &self,
        instrument_id: i64,
        items: &[NewsDraft],
    ) -> Result<(usize, Option<Rating>)> {
        let mut tx = self.pool.begin().await.context("Failed to open transaction")?;

        let mut inserted = 0usize;
        for item in items {
            let result = sqlx::query(
                r#"
                INSERT INTO news_items (
                    instrument_id, natural_id, title, summary, link, source,
                    sentiment, sentiment_score
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(instrument_id, natural_id) DO NOTHING
                "#,
            )
            .bind(instrument_id)
            .bind(&item.natural_id)
            .bind(&item.title)
            .bind(&item.summary)
            .bind(&item.link)
            .bind(&item.source)
            .bind(item.sentiment.as_str())
            .bind(item.sentiment_score)
            .execute(&mut *tx)
            .await
            .context("Failed to insert news item")?;
            inserted += result.rows_affected() as usize;
        }

        // Re-aggregate inside the same transaction so the rating and the
        // rows it was derived from commit together.
        let rows = sqlx::query(
            "SELECT sentiment FROM news_items WHERE instrument_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(instrument_id)
        .bind(AGGREGATION_WINDOW as i64)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to load labels for aggregation")?;

        let labels: Vec<SentimentLabel> = rows
            .iter()
            .map(|row| {
                let label: String = row.try_get("sentiment")?;
                Ok(SentimentLabel::parse(&label).unwrap_or(SentimentLabel::Neutral))
            })
            .collect::<Result<_>>()?;

        let rating = rating::aggregate(&labels);
        if let Some(rating) = &rating {
            sqlx::query(
                r#"
                UPDATE instruments
                SET rating = ?, rating_reason = ?, updated_at = strftime('%s', 'now')
                WHERE id = ?
                "#,
            )
            .bind(rating.label.as_str())
            .bind(&rating.reason)
            .bind(instrument_id)
            .execute(&mut *tx)
            .await
            .context("Failed to write rating")?;
        }

        tx.commit().await.context("Failed to commit news batch")?;
        Ok((inserted, rating))
    }
}
