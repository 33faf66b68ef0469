//! Offline unit tests for sentinews-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::{TimeZone, Utc};
use sentinews_core::{AnalyzerKind, AppConfig, CandidateRoster, Environment, NewsSource};
use sentinews_db::{ArticleRow, CollectionRunCounts, CollectionRunRow, DbError, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        candidates: CandidateRoster::default(),
        nyt_api_key: None,
        news_api_key: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        http_timeout_secs: 30,
        http_user_agent: "ua".to_string(),
        page_limit: 5,
        max_retries: 1,
        retry_backoff_ms: 0,
        max_consecutive_failures: 3,
        default_window_days: 7,
        naive_bayes_model_path: None,
        neural_model_path: None,
    }
}

fn bare_row(source: &str) -> ArticleRow {
    let at = Utc.with_ymd_and_hms(2020, 2, 1, 9, 30, 0).unwrap();
    ArticleRow {
        url: "https://example.com/story".to_string(),
        published_at: at,
        title: "Sanders rallies in Iowa".to_string(),
        source: source.to_string(),
        body: None,
        lexicon_p_pos: None,
        lexicon_p_neg: None,
        lexicon_p_neu: None,
        lexicon_compound: None,
        naive_bayes_p_pos: None,
        naive_bayes_p_neg: None,
        neural_p_pos: None,
        neural_p_neg: None,
        neural_p_neu: None,
        created_at: at,
        updated_at: at,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn unscored_row_converts_to_record_without_scores() {
    let record = bare_row("CNN").into_record().unwrap();
    assert_eq!(record.source, NewsSource::Cnn);
    assert_eq!(record.title, "Sanders rallies in Iowa");
    assert!(record.scores.is_empty());
}

#[test]
fn scored_row_rebuilds_each_analyzer_score() {
    let mut row = bare_row("NYT");
    row.lexicon_p_pos = Some(0.2);
    row.lexicon_p_neg = Some(0.1);
    row.lexicon_p_neu = Some(0.7);
    row.lexicon_compound = Some(0.25);
    row.naive_bayes_p_pos = Some(0.6);
    row.naive_bayes_p_neg = Some(0.4);

    let record = row.into_record().unwrap();
    let lexicon = record.scores.get(AnalyzerKind::Lexicon).unwrap();
    assert_eq!(lexicon.p_neutral, Some(0.7));
    assert_eq!(lexicon.compound, Some(0.25));
    let nb = record.scores.get(AnalyzerKind::NaiveBayes).unwrap();
    assert!(nb.p_neutral.is_none());
    assert!(record.scores.get(AnalyzerKind::Neural).is_none());
}

#[test]
fn unknown_source_column_is_rejected() {
    let err = bare_row("BBC").into_record().unwrap_err();
    assert!(
        matches!(err, DbError::InvalidColumn { column: "source", .. }),
        "got: {err:?}"
    );
}

/// Compile-time smoke test: confirm that [`CollectionRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn collection_run_row_has_expected_fields() {
    use uuid::Uuid;

    let row = CollectionRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        source: "FOX".to_string(),
        trigger_source: "cli".to_string(),
        status: "queued".to_string(),
        started_at: None,
        completed_at: None,
        fetched: 0,
        duplicates: 0,
        off_topic: 0,
        inserted: 0,
        page_failures: 0,
        malformed: 0,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.source, "FOX");
    assert_eq!(row.status, "queued");
    assert!(row.started_at.is_none());
    assert!(row.error_message.is_none());
    assert_eq!(CollectionRunCounts::default().inserted, 0);
}
