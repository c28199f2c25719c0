use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tickerflow::application::indicator_service::IndicatorService;
use tickerflow::application::news_ingestor::NewsIngestor;
use tickerflow::application::pacing::PacingGate;
use tickerflow::application::price_updater::PriceUpdater;
use tickerflow::application::CancelFlag;
use tickerflow::config::Config;
use tickerflow::domain::instrument::InstrumentSeed;
use tickerflow::domain::ports::SentimentClassifier;
use tickerflow::domain::repositories::InstrumentRepository;
use tickerflow::infrastructure::classifier::{ChatCompletionClassifier, DisabledClassifier};
use tickerflow::infrastructure::http_client_factory::HttpClientFactory;
use tickerflow::infrastructure::news_feed::RssNewsFeed;
use tickerflow::infrastructure::persistence::database::Database;
use tickerflow::infrastructure::persistence::repositories::{
    SqliteInstrumentRepository, SqliteNewsRepository, SqlitePriceRepository,
};
use tickerflow::infrastructure::price_api::HttpPriceSource;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tickerflow", about = "Daily market data and news signal pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch yesterday's price snapshot for one instrument, or the
    /// whole universe when no code is given
    UpdatePrices {
        #[arg(long)]
        code: Option<String>,
    },
    /// Ingest, deduplicate and classify news for one instrument, or
    /// the whole universe when no code is given
    IngestNews {
        #[arg(long)]
        code: Option<String>,
        #[arg(long, default_value_t = 5)]
        max_items: usize,
    },
    /// Load the instrument universe from a JSON seed file
    Seed { file: PathBuf },
    /// Print RSI and moving averages for one instrument
    Indicators { code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let db = Database::new(&config.database_url).await?;
    let instruments: Arc<dyn InstrumentRepository> =
        Arc::new(SqliteInstrumentRepository::new(db.pool.clone()));
    let prices = Arc::new(SqlitePriceRepository::new(db.pool.clone()));
    let news = Arc::new(SqliteNewsRepository::new(db.pool.clone()));

    let cancel = CancelFlag::new();
    spawn_ctrl_c_handler(cancel.clone());

    match cli.command {
        Command::UpdatePrices { code } => {
            let source = Arc::new(HttpPriceSource::new(
                HttpClientFactory::create_client(),
                config.price_source.base_url.clone(),
                config.price_source.service_key.clone(),
            ));
            let updater = PriceUpdater::new(
                instruments,
                prices,
                source,
                PacingGate::from_millis(config.pacing.price_call_delay_ms),
                cancel,
            );
            match code {
                Some(code) => {
                    let updated = updater.update_one(&code).await?;
                    if updated {
                        info!("{code}: price snapshot stored");
                    } else {
                        warn!("{code}: no data for target date");
                    }
                }
                None => {
                    let report = updater.update_all().await?;
                    info!(
                        "Batch complete. succeeded: {}, failed: {}",
                        report.succeeded, report.failed
                    );
                }
            }
        }
        Command::IngestNews { code, max_items } => {
            let feed = Arc::new(RssNewsFeed::new(
                config.news_source.base_url.clone(),
                config.news_source.locale_params.clone(),
                config.news_source.max_retries,
            ));
            let classifier: Arc<dyn SentimentClassifier> = if config.classifier.is_enabled() {
                Arc::new(ChatCompletionClassifier::new(
                    config.classifier.base_url.clone(),
                    config.classifier.api_key.clone(),
                    config.classifier.model.clone(),
                ))
            } else {
                warn!("No classifier API key configured; sentiment classification disabled");
                Arc::new(DisabledClassifier)
            };
            let ingestor = NewsIngestor::new(
                instruments,
                news,
                feed,
                classifier,
                config.news_source.query_qualifier.clone(),
                PacingGate::from_millis(config.pacing.classifier_call_delay_ms),
                PacingGate::from_millis(config.pacing.instrument_delay_ms),
                cancel,
            );
            match code {
                Some(code) => {
                    let count = ingestor.ingest_one(&code, max_items).await?;
                    info!("{code}: {count} new items stored");
                }
                None => {
                    let report = ingestor.ingest_all(max_items).await?;
                    info!(
                        "Batch complete. succeeded: {}, failed: {}",
                        report.succeeded, report.failed
                    );
                }
            }
        }
        Command::Seed { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read seed file {}", file.display()))?;
            let entries: Vec<InstrumentSeed> =
                serde_json::from_str(&raw).context("Failed to parse seed file")?;
            let created = instruments.seed(&entries).await?;
            info!("Seeded {created} new instruments ({} in file)", entries.len());
        }
        Command::Indicators { code } => {
            let service = IndicatorService::new(instruments, prices);
            let summary = service.summarize(&code).await?;
            info!(
                "{}: RSI {:.2} ({}), {} price points",
                summary.code, summary.rsi, summary.rsi_status, summary.history_len
            );
            for (period, value) in &summary.moving_averages {
                match value {
                    Some(value) => info!("MA{period}: {value:.2}"),
                    // Insufficient history: report the latest close as
                    // the explicit fallback.
                    None => match summary.latest_close {
                        Some(close) => info!("MA{period}: insufficient data (latest close {close})"),
                        None => info!("MA{period}: insufficient data"),
                    },
                }
            }
        }
    }

    Ok(())
}

fn spawn_ctrl_c_handler(cancel: CancelFlag) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping after the current instrument");
            cancel.cancel();
        }
    });
}
