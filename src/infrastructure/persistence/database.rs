use anyhow::{Context, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Singleton database wrapper
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal); // Better for concurrency

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// In-memory database for tests. A single connection keeps every
    /// query on the same ephemeral store.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        // 1. Instruments Table. Rating fields live here: the rating is a
        // derived view over recent news, not an entity of its own.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS instruments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                category TEXT,
                description TEXT,
                business TEXT,
                keywords_json TEXT,
                rating TEXT,
                rating_reason TEXT,
                created_at INTEGER DEFAULT (strftime('%s', 'now')),
                updated_at INTEGER DEFAULT (strftime('%s', 'now'))
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create instruments table")?;

        // 2. Price Records Table, unique per (instrument, trade date).
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS price_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                instrument_id INTEGER NOT NULL REFERENCES instruments(id) ON DELETE CASCADE,
                trade_date TEXT NOT NULL,
                close INTEGER,
                change_amount INTEGER,
                change_rate REAL,
                open INTEGER,
                high INTEGER,
                low INTEGER,
                volume INTEGER,
                traded_value INTEGER,
                listed_shares INTEGER,
                market_cap INTEGER,
                market_segment TEXT,
                isin TEXT,
                created_at INTEGER DEFAULT (strftime('%s', 'now')),
                updated_at INTEGER DEFAULT (strftime('%s', 'now')),
                UNIQUE (instrument_id, trade_date)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create price_records table")?;

        // Index for date-ordered history reads
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_price_records_instrument_date
            ON price_records (instrument_id, trade_date);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create price index")?;

        // 3. News Items Table, unique per (instrument, natural id).
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                instrument_id INTEGER NOT NULL REFERENCES instruments(id) ON DELETE CASCADE,
                natural_id TEXT NOT NULL,
                title TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                link TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL DEFAULT '',
                sentiment TEXT NOT NULL,
                sentiment_score REAL NOT NULL,
                created_at INTEGER DEFAULT (strftime('%s', 'now')),
                UNIQUE (instrument_id, natural_id)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create news_items table")?;

        // Index for the exact-link dedup fallback
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_news_items_instrument_link
            ON news_items (instrument_id, link);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create news link index")?;

        info!("Database schema initialized.");
        Ok(())
    }
}
