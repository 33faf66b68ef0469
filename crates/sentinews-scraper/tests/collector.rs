//! End-to-end collection runs against wiremock search APIs.

use chrono::{TimeZone, Utc};
use sentinews_core::{ArticleStore, CandidateRoster, MemoryArticleStore, NewsSource};
use sentinews_scraper::{
    run_collection, CollectionPlan, Collector, CollectorSettings, ReqwestFetcher, ScraperError,
    SourceSettings,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> ReqwestFetcher {
    ReqwestFetcher::new(5, "sentinews-test/0.1").expect("client construction should not fail")
}

fn plan(topic: &str) -> CollectionPlan {
    CollectionPlan::new(
        vec![topic.to_string()],
        Utc.with_ymd_and_hms(2020, 3, 10, 0, 0, 0).unwrap(),
    )
    .with_bounds(
        Some(Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap()),
        Some(Utc.with_ymd_and_hms(2020, 3, 9, 0, 0, 0).unwrap()),
    )
}

fn newsapi_article(url: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "source": { "id": "reuters", "name": "Reuters" },
        "url": url,
        "publishedAt": "2020-03-05T12:00:00Z",
        "title": title,
        "content": "Body text"
    })
}

fn newsapi_collector(server: &MockServer, page_limit: u32) -> Collector<ReqwestFetcher> {
    let query = SourceSettings::new(NewsSource::NewsApi, Some("test-key".to_string()))
        .with_base_url(format!("{}/v2/everything", server.uri()))
        .with_page_size(2);
    let mut settings = CollectorSettings::new(query);
    settings.page_limit = page_limit;
    Collector::new(fetcher(), settings, CandidateRoster::default())
}

#[tokio::test]
async fn two_pages_with_one_repeat_store_p1_plus_p2_minus_one() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("q", "Joe Biden"))
        .and(query_param("page", "1"))
        .and(query_param("apiKey", "test-key"))
        .and(query_param("from", "2020-03-01T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "articles": [
                newsapi_article("https://news.test/1", "Biden wins South Carolina"),
                newsapi_article("https://news.test/2", "Biden picks up endorsements"),
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "articles": [
                newsapi_article("https://news.test/2", "Biden picks up endorsements"),
                newsapi_article("https://news.test/3", "Biden surges on Super Tuesday"),
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ok", "articles": [] })),
        )
        .with_priority(10)
        .mount(&server)
        .await;

    let store = MemoryArticleStore::new();
    let mut collector = newsapi_collector(&server, 5);
    let report = run_collection(&mut collector, &store, plan("Joe Biden"))
        .await
        .expect("collection should succeed");

    assert_eq!(store.count().await.unwrap(), 2 + 2 - 1);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.duplicates, 1);
    let stored = store.find("https://news.test/3").await.unwrap().unwrap();
    assert_eq!(stored.source, NewsSource::NewsApi);
    assert_eq!(stored.body.as_deref(), Some("Body text"));
}

#[tokio::test]
async fn forbidden_response_aborts_the_source() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/everything"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "status": "error",
            "code": "apiKeyInvalid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryArticleStore::new();
    let mut collector = newsapi_collector(&server, 5);
    let err = run_collection(&mut collector, &store, plan("Joe Biden"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScraperError::SourceUnavailable {
            news_source: NewsSource::NewsApi,
            ..
        }
    ));
    assert!(
        !err.to_string().contains("test-key"),
        "API keys must not leak into errors"
    );
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn fox_jsonp_search_is_collected() {
    let server = MockServer::start().await;

    let page = r#"angular.callbacks._0({"response":{"docs":[
        {"date":"2020-03-03T18:00:00Z","title":"Sanders rallies in Vermont","url":["https://www.foxnews.com/politics/sanders"]}
    ]}});"#;

    Mock::given(method("GET"))
        .and(path("/v1/content/search"))
        .and(query_param("start", "0"))
        .and(query_param("min_date", "2020-03-01"))
        .and(query_param("max_date", "2020-03-09"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/content/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"angular.callbacks._0({"response":{"docs":[]}});"#),
        )
        .with_priority(10)
        .mount(&server)
        .await;

    let query = SourceSettings::new(NewsSource::Fox, None)
        .with_base_url(format!("{}/v1/content/search", server.uri()));
    let mut collector = Collector::new(
        fetcher(),
        CollectorSettings::new(query),
        CandidateRoster::default(),
    );
    let store = MemoryArticleStore::new();

    let report = run_collection(&mut collector, &store, plan("Bernie Sanders"))
        .await
        .expect("collection should succeed");

    assert_eq!(report.inserted, 1);
    assert!(store
        .find("https://www.foxnews.com/politics/sanders")
        .await
        .unwrap()
        .is_some());
}
