use chrono::{TimeZone, Utc};

use super::*;

fn record(url: &str, day: u32, source: NewsSource) -> ArticleRecord {
    ArticleRecord::new(
        url,
        Utc.with_ymd_and_hms(2020, 2, day, 12, 0, 0).unwrap(),
        format!("Biden story {day}"),
        source,
    )
}

fn lexicon_score() -> SentimentScore {
    SentimentScore::three_class(AnalyzerKind::Lexicon, 0.25, 0.25, 0.5).with_compound(0.0)
}

#[tokio::test]
async fn second_insert_of_same_url_is_a_noop() {
    let store = MemoryArticleStore::new();
    let first = record("https://a.test/1", 1, NewsSource::Cnn);
    assert!(store.insert(&first).await.unwrap());

    let mut again = first.clone();
    again.title = "Different title".to_string();
    assert!(!store.insert(&again).await.unwrap());

    assert_eq!(store.count().await.unwrap(), 1);
    let stored = store.find("https://a.test/1").await.unwrap().unwrap();
    assert_eq!(stored.title, "Biden story 1");
}

#[tokio::test]
async fn delete_then_find_returns_none() {
    let store = MemoryArticleStore::new();
    store
        .insert(&record("https://a.test/1", 1, NewsSource::Fox))
        .await
        .unwrap();
    assert!(store.delete("https://a.test/1").await.unwrap());
    assert!(store.find("https://a.test/1").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_of_absent_url_is_a_noop() {
    let store = MemoryArticleStore::new();
    store
        .insert(&record("https://a.test/1", 1, NewsSource::Fox))
        .await
        .unwrap();
    assert!(!store.delete("https://a.test/missing").await.unwrap());
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn update_scores_on_missing_url_is_not_found() {
    let store = MemoryArticleStore::new();
    let err = store
        .update_scores("https://a.test/missing", &lexicon_score())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "got: {err:?}");
}

#[tokio::test]
async fn update_scores_rejects_invalid_score() {
    let store = MemoryArticleStore::new();
    store
        .insert(&record("https://a.test/1", 1, NewsSource::Nyt))
        .await
        .unwrap();
    let bad = SentimentScore::two_class(AnalyzerKind::NaiveBayes, 0.9, 0.9);
    let err = store.update_scores("https://a.test/1", &bad).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidScore(_)), "got: {err:?}");
}

#[tokio::test]
async fn list_unscored_tracks_each_analyzer_independently() {
    let store = MemoryArticleStore::new();
    store
        .insert(&record("https://a.test/2", 2, NewsSource::Nyt))
        .await
        .unwrap();
    store
        .insert(&record("https://a.test/1", 1, NewsSource::Nyt))
        .await
        .unwrap();
    store
        .update_scores("https://a.test/1", &lexicon_score())
        .await
        .unwrap();

    let lexicon = store.list_unscored(AnalyzerKind::Lexicon, None).await.unwrap();
    assert_eq!(lexicon.len(), 1);
    assert_eq!(lexicon[0].url, "https://a.test/2");

    let neural = store.list_unscored(AnalyzerKind::Neural, None).await.unwrap();
    let urls: Vec<&str> = neural.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a.test/1", "https://a.test/2"]);

    let limited = store
        .list_unscored(AnalyzerKind::Neural, Some(1))
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn update_article_applies_partial_update() {
    let store = MemoryArticleStore::new();
    store
        .insert(&record("https://a.test/1", 1, NewsSource::Nyt))
        .await
        .unwrap();
    let update = ArticleUpdate {
        source: Some(NewsSource::Cnn),
        ..ArticleUpdate::default()
    };
    let updated = store.update_article("https://a.test/1", &update).await.unwrap();
    assert_eq!(updated.source, NewsSource::Cnn);
    assert_eq!(updated.title, "Biden story 1");

    let err = store
        .update_article("https://a.test/missing", &update)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn source_urls_only_returns_matching_source() {
    let store = MemoryArticleStore::new();
    store
        .insert(&record("https://a.test/nyt", 1, NewsSource::Nyt))
        .await
        .unwrap();
    store
        .insert(&record("https://a.test/cnn", 1, NewsSource::Cnn))
        .await
        .unwrap();
    let urls = store.source_urls(NewsSource::Nyt).await.unwrap();
    assert_eq!(urls.len(), 1);
    assert!(urls.contains("https://a.test/nyt"));
}

#[tokio::test]
async fn clones_share_state() {
    let store = MemoryArticleStore::new();
    let other = store.clone();
    store
        .insert(&record("https://a.test/1", 1, NewsSource::Nyt))
        .await
        .unwrap();
    assert_eq!(other.count().await.unwrap(), 1);
}

#[tokio::test]
async fn retitled_record_returns_to_unscored_list() {
    let store = MemoryArticleStore::new();
    store
        .insert(&record("https://a.test/1", 1, NewsSource::Nyt))
        .await
        .unwrap();
    store
        .update_scores("https://a.test/1", &lexicon_score())
        .await
        .unwrap();
    assert!(store
        .list_unscored(AnalyzerKind::Lexicon, None)
        .await
        .unwrap()
        .is_empty());

    let update = ArticleUpdate {
        title: Some("Biden story, corrected".to_string()),
        ..ArticleUpdate::default()
    };
    let updated = store.update_article("https://a.test/1", &update).await.unwrap();
    assert!(updated.scores.is_empty());

    let unscored = store.list_unscored(AnalyzerKind::Lexicon, None).await.unwrap();
    assert_eq!(unscored.len(), 1);
    assert_eq!(unscored[0].url, "https://a.test/1");
}

#[tokio::test]
async fn list_titles_is_oldest_first() {
    let store = MemoryArticleStore::new();
    for (url, day) in [("https://a.test/b", 2), ("https://a.test/a", 1)] {
        store
            .insert(&record(url, day, NewsSource::Cnn))
            .await
            .unwrap();
    }

    let titles = store.list_titles().await.unwrap();
    assert_eq!(
        titles,
        vec![
            ArticleTitle {
                url: "https://a.test/a".to_string(),
                title: "Biden story 1".to_string(),
            },
            ArticleTitle {
                url: "https://a.test/b".to_string(),
                title: "Biden story 2".to_string(),
            },
        ]
    );
}
