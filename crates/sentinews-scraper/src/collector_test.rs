use std::sync::Mutex;

use chrono::TimeZone;
use futures::StreamExt;
use sentinews_core::MemoryArticleStore;

use super::*;
use crate::fetch::FetchResponse;
use crate::run::run_collection;

type Responder = dyn Fn(&str, usize) -> FetchResponse + Send + Sync;

/// Answers every GET through `respond(url, earlier_calls_to_same_url)`.
#[derive(Clone)]
struct FakeFetcher {
    respond: Arc<Responder>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    fn new(respond: impl Fn(&str, usize) -> FetchResponse + Send + Sync + 'static) -> Self {
        Self {
            respond: Arc::new(respond),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn calls_matching(&self, needle: &str) -> usize {
        self.calls().iter().filter(|u| u.contains(needle)).count()
    }
}

impl HttpFetch for FakeFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, ScraperError> {
        let earlier = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.iter().filter(|c| c.as_str() == url).count();
            calls.push(url.to_string());
            n
        };
        Ok((self.respond)(url, earlier))
    }
}

fn ok(body: String) -> FetchResponse {
    FetchResponse { status: 200, body }
}

fn status(code: u16) -> FetchResponse {
    FetchResponse {
        status: code,
        body: String::new(),
    }
}

fn cnn_page(items: &[(&str, &str)]) -> FetchResponse {
    let result: Vec<serde_json::Value> = items
        .iter()
        .map(|(url, title)| {
            serde_json::json!({
                "type": "article",
                "url": url,
                "firstPublishDate": "2020-01-15T10:00:00Z",
                "headline": title,
            })
        })
        .collect();
    ok(serde_json::json!({ "result": result }).to_string())
}

fn empty_page() -> FetchResponse {
    cnn_page(&[])
}

fn is_page(url: &str, page: u32) -> bool {
    url.contains(&format!("&page={page}&"))
}

fn settings() -> CollectorSettings {
    let mut settings = CollectorSettings::new(SourceSettings::new(NewsSource::Cnn, None));
    settings.page_limit = 3;
    settings
}

fn plan(topics: &[&str]) -> CollectionPlan {
    CollectionPlan::new(
        topics.iter().map(ToString::to_string).collect(),
        Utc.with_ymd_and_hms(2020, 2, 1, 0, 0, 0).unwrap(),
    )
    .with_bounds(
        Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        Some(Utc.with_ymd_and_hms(2020, 1, 31, 0, 0, 0).unwrap()),
    )
}

fn collector(fetcher: FakeFetcher) -> Collector<FakeFetcher> {
    Collector::new(fetcher, settings(), CandidateRoster::default())
}

#[tokio::test]
async fn repeated_url_across_pages_is_stored_once() {
    let fetcher = FakeFetcher::new(|url, _| {
        if is_page(url, 1) {
            cnn_page(&[
                ("https://cnn.test/a", "Biden leads"),
                ("https://cnn.test/b", "Biden trails"),
                ("https://cnn.test/c", "Biden in Iowa"),
            ])
        } else if is_page(url, 2) {
            cnn_page(&[
                ("https://cnn.test/c", "Biden in Iowa"),
                ("https://cnn.test/d", "Biden in Ohio"),
            ])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher.clone());

    let report = run_collection(&mut collector, &store, plan(&["Joe Biden"]))
        .await
        .unwrap();

    assert_eq!(store.count().await.unwrap(), 3 + 2 - 1);
    assert_eq!(report.fetched, 5);
    assert_eq!(report.inserted, 4);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.page_failures, 0);
    assert_eq!(collector.state(), CollectorState::Done);
    assert_eq!(fetcher.calls().len(), 3, "two full pages plus the empty one");
}

#[tokio::test]
async fn titles_must_name_exactly_one_candidate() {
    let fetcher = FakeFetcher::new(|url, _| {
        if is_page(url, 1) {
            cnn_page(&[
                ("https://cnn.test/1", "Only Biden"),
                ("https://cnn.test/2", "Trump and Biden"),
                ("https://cnn.test/3", "a bunch of nonsense"),
            ])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher);

    let report = run_collection(&mut collector, &store, plan(&["Joe Biden"]))
        .await
        .unwrap();

    assert_eq!(report.off_topic, 2);
    assert_eq!(report.inserted, 1);
    assert!(store.find("https://cnn.test/1").await.unwrap().is_some());
}

#[tokio::test]
async fn failing_page_is_retried_once_then_skipped() {
    let fetcher = FakeFetcher::new(|url, _| {
        if is_page(url, 1) {
            status(500)
        } else if is_page(url, 2) {
            cnn_page(&[("https://cnn.test/p2", "Warren surges")])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher.clone());

    let report = run_collection(&mut collector, &store, plan(&["Elizabeth Warren"]))
        .await
        .unwrap();

    assert_eq!(fetcher.calls_matching("&page=1&"), 2);
    assert_eq!(report.page_failures, 1);
    assert_eq!(report.inserted, 1);
}

#[tokio::test]
async fn transient_error_recovers_on_retry() {
    let fetcher = FakeFetcher::new(|url, earlier| {
        if is_page(url, 1) && earlier == 0 {
            status(503)
        } else if is_page(url, 1) {
            cnn_page(&[("https://cnn.test/x", "Harris rallies")])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher);

    let report = run_collection(&mut collector, &store, plan(&["Kamala Harris"]))
        .await
        .unwrap();

    assert_eq!(report.page_failures, 0);
    assert_eq!(report.inserted, 1);
}

#[tokio::test]
async fn auth_failure_is_fatal_and_not_retried() {
    let fetcher = FakeFetcher::new(|_, _| status(401));
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher.clone());

    let err = run_collection(&mut collector, &store, plan(&["Joe Biden", "Donald Trump"]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScraperError::SourceUnavailable {
            news_source: NewsSource::Cnn,
            ..
        }
    ));
    assert_eq!(fetcher.calls().len(), 1);
    assert_eq!(collector.state(), CollectorState::Done);
    assert!(collector.next_article().await.unwrap().is_none());
}

#[tokio::test]
async fn persistent_server_errors_make_the_source_unavailable() {
    let fetcher = FakeFetcher::new(|_, _| status(502));
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher.clone());

    let err = run_collection(&mut collector, &store, plan(&["Joe Biden", "Donald Trump"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::SourceUnavailable { .. }));
    assert_eq!(collector.report().page_failures, 3);
    assert_eq!(fetcher.calls().len(), 6, "three pages, each tried twice");
}

#[tokio::test]
async fn unparseable_page_counts_as_failure_and_collection_continues() {
    let fetcher = FakeFetcher::new(|url, _| {
        if is_page(url, 1) {
            ok("<html>maintenance</html>".to_string())
        } else if is_page(url, 2) {
            cnn_page(&[("https://cnn.test/ok", "Sanders wins Nevada")])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher.clone());

    let report = run_collection(&mut collector, &store, plan(&["Bernie Sanders"]))
        .await
        .unwrap();

    assert_eq!(report.page_failures, 1);
    assert_eq!(report.inserted, 1);
    assert_eq!(fetcher.calls_matching("&page=1&"), 1, "bad payloads are not retried");
}

#[tokio::test]
async fn empty_page_moves_on_to_the_next_topic() {
    let fetcher = FakeFetcher::new(|url, _| {
        if url.contains("q=Joe%20Biden") {
            empty_page()
        } else if is_page(url, 1) {
            cnn_page(&[("https://cnn.test/t", "Trump speaks")])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher.clone());

    let report = run_collection(&mut collector, &store, plan(&["Joe Biden", "Donald Trump"]))
        .await
        .unwrap();

    assert_eq!(fetcher.calls_matching("q=Joe%20Biden"), 1);
    assert_eq!(fetcher.calls_matching("q=Donald%20Trump"), 2);
    assert_eq!(report.inserted, 1);
}

#[tokio::test]
async fn page_limit_bounds_requests_per_topic() {
    let fetcher = FakeFetcher::new(|url, _| {
        let story = format!("https://cnn.test/{}", url.len());
        cnn_page(&[(story.as_str(), "Buttigieg again")])
    });
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher.clone());

    run_collection(&mut collector, &store, plan(&["Pete Buttigieg"]))
        .await
        .unwrap();

    assert_eq!(fetcher.calls().len(), 3);
    assert!(fetcher.calls().iter().all(|u| !is_page(u, 4)));
}

#[tokio::test]
async fn stored_urls_are_skipped_after_seeding() {
    let fetcher = FakeFetcher::new(|url, _| {
        if is_page(url, 1) {
            cnn_page(&[
                ("https://cnn.test/old", "Biden old news"),
                ("https://cnn.test/new", "Biden new news"),
            ])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let existing = ArticleRecord::new(
        "https://cnn.test/old",
        Utc.with_ymd_and_hms(2020, 1, 10, 0, 0, 0).unwrap(),
        "Biden old news",
        NewsSource::Cnn,
    );
    store.insert(&existing).await.unwrap();
    let mut collector = collector(fetcher);

    let report = run_collection(&mut collector, &store, plan(&["Joe Biden"]))
        .await
        .unwrap();

    assert!(collector.has_seen("https://cnn.test/old"));
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.inserted, 1);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn rerun_restarts_from_page_zero_and_inserts_nothing_new() {
    let fetcher = FakeFetcher::new(|url, _| {
        if is_page(url, 1) {
            cnn_page(&[("https://cnn.test/a", "Biden leads")])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let mut collector = collector(fetcher.clone());

    run_collection(&mut collector, &store, plan(&["Joe Biden"]))
        .await
        .unwrap();
    let second = run_collection(&mut collector, &store, plan(&["Joe Biden"]))
        .await
        .unwrap();

    assert_eq!(second.inserted, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(fetcher.calls_matching("&page=1&"), 2);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn cancel_stops_before_the_next_page() {
    let fetcher = FakeFetcher::new(|url, _| {
        let first = format!("https://cnn.test/{}/1", url.len());
        let second = format!("https://cnn.test/{}/2", url.len());
        cnn_page(&[(first.as_str(), "Trump one"), (second.as_str(), "Trump two")])
    });
    let mut collector = collector(fetcher.clone());
    let cancel = collector.cancel_handle();
    collector.begin(plan(&["Donald Trump"]));

    let first = collector.next_article().await.unwrap();
    assert!(first.is_some());
    cancel.cancel();

    let second = collector.next_article().await.unwrap();
    assert!(second.is_some(), "records already fetched are still emitted");
    assert!(collector.next_article().await.unwrap().is_none());
    assert_eq!(collector.state(), CollectorState::Done);
    assert_eq!(fetcher.calls().len(), 1);
}

#[tokio::test]
async fn unstarted_collector_yields_nothing() {
    let fetcher = FakeFetcher::new(|_, _| empty_page());
    let mut collector = collector(fetcher.clone());
    assert_eq!(collector.state(), CollectorState::Idle);
    assert!(collector.next_article().await.unwrap().is_none());
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn missing_api_key_is_fatal() {
    let fetcher = FakeFetcher::new(|_, _| status(200));
    let settings = CollectorSettings::new(SourceSettings::new(NewsSource::Nyt, None));
    let mut collector = Collector::new(fetcher.clone(), settings, CandidateRoster::default());
    collector.begin(plan(&["Joe Biden"]));

    let err = collector.next_article().await.unwrap_err();
    assert!(matches!(err, ScraperError::MissingApiKey(NewsSource::Nyt)));
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn body_fetch_fills_missing_bodies() {
    let fetcher = FakeFetcher::new(|url, _| {
        if url == "https://cnn.test/story" {
            ok("<div class=\"article__content\"><p>Biden spoke at length.</p></div>".to_string())
        } else if url == "https://cnn.test/gone" {
            status(404)
        } else if is_page(url, 1) {
            cnn_page(&[
                ("https://cnn.test/story", "Biden speaks"),
                ("https://cnn.test/gone", "Biden vanishes"),
            ])
        } else {
            empty_page()
        }
    });
    let store = MemoryArticleStore::new();
    let mut settings = settings();
    settings.fetch_bodies = true;
    let mut collector = Collector::new(fetcher, settings, CandidateRoster::default());

    let report = run_collection(&mut collector, &store, plan(&["Joe Biden"]))
        .await
        .unwrap();

    assert_eq!(report.inserted, 2);
    let story = store.find("https://cnn.test/story").await.unwrap().unwrap();
    assert_eq!(story.body.as_deref(), Some("Biden spoke at length."));
    let gone = store.find("https://cnn.test/gone").await.unwrap().unwrap();
    assert!(gone.body.is_none());
}

#[tokio::test]
async fn stream_yields_the_same_records() {
    let fetcher = FakeFetcher::new(|url, _| {
        if is_page(url, 1) {
            cnn_page(&[
                ("https://cnn.test/s1", "Warren one"),
                ("https://cnn.test/s2", "Warren two"),
            ])
        } else {
            empty_page()
        }
    });
    let mut collector = collector(fetcher);
    collector.begin(plan(&["Elizabeth Warren"]));

    let urls: Vec<String> = collector
        .into_stream()
        .map(|r| r.unwrap().url)
        .collect()
        .await;
    assert_eq!(urls, vec!["https://cnn.test/s1", "https://cnn.test/s2"]);
}
