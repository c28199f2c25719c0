mod common;

use common::{
    FailingClassifier, ScriptedClassifier, StaticFeed, entry, news_ingestor, seed_instruments,
    test_db,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tickerflow::domain::news::{NewsDraft, SentimentLabel};
use tickerflow::domain::rating::RatingLabel;
use tickerflow::domain::repositories::{InstrumentRepository, NewsRepository};
use tickerflow::infrastructure::persistence::repositories::{
    SqliteInstrumentRepository, SqliteNewsRepository,
};

#[tokio::test]
async fn test_second_pass_inserts_nothing() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;

    let feed = Arc::new(StaticFeed::new(vec![
        entry("실적 발표", "https://example.com/news/1"),
        entry("신제품 공개", "https://example.com/news/2"),
        entry("공장 증설", "https://example.com/news/3"),
    ]));
    let ingestor = news_ingestor(&db, feed, Arc::new(ScriptedClassifier::new()));

    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 3);
    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 0);

    let news = SqliteNewsRepository::new(db.pool.clone());
    assert_eq!(news.list_for_instrument(1).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_in_batch_duplicates_collapse() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;

    let feed = Arc::new(StaticFeed::new(vec![
        entry("실적 발표", "https://example.com/news/1"),
        entry("실적 발표 (재송)", "https://example.com/news/1"),
    ]));
    let ingestor = news_ingestor(&db, feed, Arc::new(ScriptedClassifier::new()));

    // Same link means the same natural identifier; only one draft survives.
    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 1);
}

#[tokio::test]
async fn test_max_items_caps_classification_and_inserts() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;

    let feed = Arc::new(StaticFeed::new(
        (1..=5)
            .map(|i| entry(&format!("기사 {i}"), &format!("https://example.com/news/{i}")))
            .collect(),
    ));
    let classifier = Arc::new(ScriptedClassifier::new());
    let ingestor = news_ingestor(&db, feed, classifier.clone());

    assert_eq!(ingestor.ingest_one("005930", 2).await.unwrap(), 2);
    // Items beyond the cap are never sent to the classifier.
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_classifier_failure_falls_back_to_neutral() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;

    let feed = Arc::new(StaticFeed::new(vec![entry(
        "실적 발표",
        "https://example.com/news/1",
    )]));
    let ingestor = news_ingestor(&db, feed, Arc::new(FailingClassifier));

    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 1);

    let news = SqliteNewsRepository::new(db.pool.clone());
    let items = news.list_for_instrument(1).await.unwrap();
    assert_eq!(items[0].sentiment, SentimentLabel::Neutral);
    assert_eq!(items[0].sentiment_score, 0.5);
}

#[tokio::test]
async fn test_positive_coverage_writes_buy_rating() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;

    let classifier = Arc::new(ScriptedClassifier::new());
    let mut entries = Vec::new();
    for i in 1..=5 {
        let title = format!("호재 {i}");
        classifier.script(&title, SentimentLabel::Positive, 0.9);
        entries.push(entry(&title, &format!("https://example.com/good/{i}")));
    }
    classifier.script("악재 1", SentimentLabel::Negative, 0.8);
    entries.push(entry("악재 1", "https://example.com/bad/1"));

    let feed = Arc::new(StaticFeed::new(entries));
    let ingestor = news_ingestor(&db, feed, classifier);

    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 6);

    let instruments = SqliteInstrumentRepository::new(db.pool.clone());
    let rating = instruments
        .find_by_code("005930")
        .await
        .unwrap()
        .unwrap()
        .rating
        .expect("rating written with the batch");
    assert_eq!(rating.label, RatingLabel::Buy);
    assert!(rating.reason.contains("5 of 6"));
}

#[tokio::test]
async fn test_elevated_negatives_write_hold_rating() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;

    let classifier = Arc::new(ScriptedClassifier::new());
    let mut entries = Vec::new();
    for i in 1..=3 {
        let title = format!("악재 {i}");
        classifier.script(&title, SentimentLabel::Negative, 0.8);
        entries.push(entry(&title, &format!("https://example.com/bad/{i}")));
    }
    entries.push(entry("중립 1", "https://example.com/etc/1"));

    let feed = Arc::new(StaticFeed::new(entries));
    let ingestor = news_ingestor(&db, feed, classifier);

    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 4);

    let instruments = SqliteInstrumentRepository::new(db.pool.clone());
    let rating = instruments
        .find_by_code("005930")
        .await
        .unwrap()
        .unwrap()
        .rating
        .unwrap();
    assert_eq!(rating.label, RatingLabel::Hold);
    assert!(rating.reason.contains("3 of 4"));
}

#[tokio::test]
async fn test_empty_pass_leaves_rating_untouched() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;

    let classifier = Arc::new(ScriptedClassifier::new());
    classifier.script("악재", SentimentLabel::Negative, 0.8);
    let feed = Arc::new(StaticFeed::new(vec![
        entry("악재", "https://example.com/bad/1"),
        entry("중립", "https://example.com/etc/1"),
    ]));
    let ingestor = news_ingestor(&db, feed.clone(), classifier);

    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 2);
    let instruments = SqliteInstrumentRepository::new(db.pool.clone());
    let before = instruments
        .find_by_code("005930")
        .await
        .unwrap()
        .unwrap()
        .rating
        .unwrap();

    // Everything already stored: no inserts, no re-aggregation.
    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 0);
    let after = instruments
        .find_by_code("005930")
        .await
        .unwrap()
        .unwrap()
        .rating
        .unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_link_fallback_catches_rows_with_legacy_identifiers() {
    let db = test_db().await;
    seed_instruments(&db, &[("005930", "삼성전자")]).await;

    // A row stored under an identifier scheme the current derivation
    // would not reproduce.
    let news = SqliteNewsRepository::new(db.pool.clone());
    let legacy = NewsDraft {
        natural_id: "legacy-0001".to_string(),
        title: "실적 발표".to_string(),
        summary: String::new(),
        link: "https://example.com/old?id=1".to_string(),
        source: "Test Wire".to_string(),
        sentiment: SentimentLabel::Neutral,
        sentiment_score: 0.5,
    };
    news.insert_batch_and_rate(1, std::slice::from_ref(&legacy))
        .await
        .unwrap();

    let feed = Arc::new(StaticFeed::new(vec![entry(
        "실적 발표",
        "https://example.com/old?id=1",
    )]));
    let ingestor = news_ingestor(&db, feed, Arc::new(ScriptedClassifier::new()));

    assert_eq!(ingestor.ingest_one("005930", 10).await.unwrap(), 0);
    assert_eq!(news.list_for_instrument(1).await.unwrap().len(), 1);
}
