mod common;

use common::{seed_instruments, snapshot, test_db};
use std::sync::Arc;
use tickerflow::application::indicator_service::IndicatorService;
use tickerflow::domain::errors::PipelineError;
use tickerflow::domain::indicators::RsiStatus;
use tickerflow::domain::repositories::PriceRepository;
use tickerflow::infrastructure::persistence::repositories::{
    SqliteInstrumentRepository, SqlitePriceRepository,
};

fn service(db: &tickerflow::infrastructure::persistence::database::Database) -> IndicatorService {
    IndicatorService::new(
        Arc::new(SqliteInstrumentRepository::new(db.pool.clone())),
        Arc::new(SqlitePriceRepository::new(db.pool.clone())),
    )
}

#[tokio::test]
async fn test_summary_over_stored_history() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;
    let prices = SqlitePriceRepository::new(db.pool.clone());

    // 25 strictly rising closes, upserted newest first to prove the
    // history read re-orders by trade date.
    for i in (0..25i64).rev() {
        let date = format!("202601{:02}", i + 1);
        prices
            .upsert(1, &snapshot(&date, 1_000 + i * 10))
            .await
            .unwrap();
    }

    let summary = service(&db).summarize("005930").await.unwrap();
    assert_eq!(summary.history_len, 25);
    assert_eq!(summary.latest_close, Some(1_240));
    // Monotonic rise: zero average loss pins RSI to its ceiling.
    assert_eq!(summary.rsi, 100.0);
    assert_eq!(summary.rsi_status, RsiStatus::Overbought);

    let ma: Vec<(usize, Option<f64>)> = summary.moving_averages.clone();
    assert_eq!(ma[0], (20, Some(1_145.0)));
    assert_eq!(ma[1], (60, None));
    assert_eq!(ma[2], (120, None));
}

#[tokio::test]
async fn test_short_history_yields_neutral_defaults() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;
    let prices = SqlitePriceRepository::new(db.pool.clone());

    for i in 0..5i64 {
        let date = format!("202601{:02}", i + 1);
        prices.upsert(1, &snapshot(&date, 2_000 + i * 50)).await.unwrap();
    }

    let summary = service(&db).summarize("005930").await.unwrap();
    assert_eq!(summary.rsi, 50.0);
    assert_eq!(summary.rsi_status, RsiStatus::Neutral);
    assert!(summary.moving_averages.iter().all(|(_, v)| v.is_none()));
    assert_eq!(summary.latest_close, Some(2_200));
}

#[tokio::test]
async fn test_unknown_code_surfaces_not_found() {
    let db = test_db().await;

    let err = service(&db).summarize("999999").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::InstrumentNotFound { .. })
    ));
}
