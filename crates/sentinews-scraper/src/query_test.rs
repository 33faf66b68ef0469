use chrono::TimeZone;

use super::*;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 30, 15).unwrap()
}

fn nyt() -> SourceSettings {
    SourceSettings::new(NewsSource::Nyt, Some("nyt-key".to_string()))
}

#[test]
fn nyt_uses_compact_dates_and_zero_based_pages() {
    let q = build_query(
        &nyt(),
        "Joe Biden",
        2,
        Some(at(2020, 1, 1)),
        Some(at(2020, 1, 31)),
        at(2020, 3, 1),
    )
    .unwrap();
    assert_eq!(
        q.url,
        "https://api.nytimes.com/svc/search/v2/articlesearch.json?q=Joe%20Biden&page=2\
         &begin_date=20200101&end_date=20200131&sort=newest&api-key=nyt%2Dkey"
    );
    assert_eq!(q.page, 2);
    assert_eq!(q.topic, "Joe Biden");
}

#[test]
fn fox_uses_dashed_dates_and_offset_paging() {
    let settings = SourceSettings::new(NewsSource::Fox, None);
    let q = build_query(
        &settings,
        "Pete Buttigieg",
        3,
        Some(at(2020, 2, 1)),
        Some(at(2020, 2, 9)),
        at(2020, 3, 1),
    )
    .unwrap();
    assert!(q.url.starts_with("https://api.foxnews.com/v1/content/search?q=Pete%20Buttigieg&"));
    assert!(q.url.contains("&min_date=2020-02-01&max_date=2020-02-09&"));
    assert!(q.url.contains("&start=30&"));
}

#[test]
fn cnn_has_no_date_params_but_carries_the_window() {
    let settings = SourceSettings::new(NewsSource::Cnn, None).with_page_size(25);
    let q = build_query(
        &settings,
        "Kamala Harris",
        1,
        Some(at(2020, 2, 1)),
        Some(at(2020, 2, 9)),
        at(2020, 3, 1),
    )
    .unwrap();
    assert_eq!(
        q.url,
        "https://search.api.cnn.io/content?q=Kamala%20Harris&size=25&type=article&sort=newest&page=2&from=25"
    );
    assert_eq!(q.window.start, at(2020, 2, 1));
    assert_eq!(q.window.end, at(2020, 2, 9));
}

#[test]
fn newsapi_uses_iso_seconds_and_one_based_pages() {
    let mut settings = SourceSettings::new(NewsSource::NewsApi, Some("k".to_string()));
    settings.outlets = vec!["cnn".to_string(), "fox-news".to_string()];
    let q = build_query(
        &settings,
        "Bernie Sanders",
        0,
        Some(at(2020, 1, 1)),
        Some(at(2020, 1, 2)),
        at(2020, 3, 1),
    )
    .unwrap();
    assert!(q.url.contains("&from=2020-01-01T12:30:15&to=2020-01-02T12:30:15&"));
    assert!(q.url.contains("&page=1&pageSize=100&apiKey=k"));
    assert!(q.url.ends_with("&sources=cnn%2Cfox%2Dnews"));
}

#[test]
fn inverted_bounds_fall_back_to_trailing_week() {
    let now = at(2020, 3, 10);
    let q = build_query(
        &nyt(),
        "Donald Trump",
        0,
        Some(at(2020, 3, 5)),
        Some(at(2020, 3, 1)),
        now,
    )
    .unwrap();
    assert_eq!(q.window, DateWindow::trailing(now, 7));
    assert!(q.url.contains("&begin_date=20200303&end_date=20200310&"));
}

#[test]
fn missing_bounds_use_configured_window_days() {
    let now = at(2020, 3, 10);
    let mut settings = nyt();
    settings.default_window_days = 2;
    let q = build_query(&settings, "Joe Biden", 0, None, None, now).unwrap();
    assert!(q.url.contains("&begin_date=20200308&end_date=20200310&"));
}

#[test]
fn build_is_deterministic_for_fixed_now() {
    let now = at(2020, 3, 10);
    let a = build_query(&nyt(), "Elizabeth Warren", 1, None, None, now).unwrap();
    let b = build_query(&nyt(), "Elizabeth Warren", 1, None, None, now).unwrap();
    assert_eq!(a, b);
}

#[test]
fn topic_is_percent_encoded() {
    let settings = SourceSettings::new(NewsSource::Cnn, None);
    let q = build_query(&settings, "O'Rourke & co?", 0, None, None, at(2020, 1, 1)).unwrap();
    assert!(q.url.contains("q=O%27Rourke%20%26%20co%3F&"), "got {}", q.url);
}

#[test]
fn keyed_sources_without_key_fail() {
    let settings = SourceSettings::new(NewsSource::NewsApi, None);
    let err = build_query(&settings, "Joe Biden", 0, None, None, at(2020, 1, 1)).unwrap_err();
    assert!(matches!(err, ScraperError::MissingApiKey(NewsSource::NewsApi)));

    let blank = SourceSettings::new(NewsSource::Nyt, Some("  ".to_string()));
    assert!(build_query(&blank, "Joe Biden", 0, None, None, at(2020, 1, 1)).is_err());
}

#[test]
fn base_url_override_drops_trailing_slash() {
    let settings = SourceSettings::new(NewsSource::Cnn, None).with_base_url("http://127.0.0.1:9/");
    let q = build_query(&settings, "Joe Biden", 0, None, None, at(2020, 1, 1)).unwrap();
    assert!(q.url.starts_with("http://127.0.0.1:9?q=Joe%20Biden&"));
}

#[test]
fn debug_redacts_api_key() {
    let rendered = format!("{:?}", nyt());
    assert!(!rendered.contains("nyt-key"));
    assert!(rendered.contains("[redacted]"));
}
