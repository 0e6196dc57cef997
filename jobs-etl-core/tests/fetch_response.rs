use std::time::Duration;

use jobs_etl_core::config::ApiConfig;
use jobs_etl_core::contract::JobSource;
use jobs_etl_core::error::{FetchError, BODY_SNIPPET_CHARS};
use jobs_etl_core::fetch::{jobs_url, parse_jobs_response, ApiJobSource};
use reqwest::Url;

#[test]
fn test_jobs_url_appends_path_and_page() {
    let base = Url::parse("https://www.themuse.com/api/public").unwrap();
    assert_eq!(
        jobs_url(&base, 3).as_str(),
        "https://www.themuse.com/api/public/jobs?page=3"
    );

    let trailing = Url::parse("https://www.themuse.com/api/public/").unwrap();
    assert_eq!(
        jobs_url(&trailing, 0).as_str(),
        "https://www.themuse.com/api/public/jobs?page=0"
    );
}

#[test]
fn test_jobs_url_keeps_existing_query_pairs() {
    let base = Url::parse("https://api.example.com/v2?category=Data%20Science").unwrap();
    let url = jobs_url(&base, 1);

    assert_eq!(url.path(), "/v2/jobs");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("category".to_string(), "Data Science".to_string()),
            ("page".to_string(), "1".to_string()),
        ]
    );
}

#[test]
fn test_parse_jobs_response_returns_results_in_order() {
    let body = r#"{"page": 1, "page_count": 99, "results": [{"name": "a"}, {"name": "b"}, 7]}"#;

    let jobs = parse_jobs_response(200, body, "results").expect("valid response");

    assert_eq!(jobs.len(), 3);
    assert_eq!(jobs[0]["name"], "a");
    assert_eq!(jobs[1]["name"], "b");
    assert_eq!(jobs[2], 7);
}

#[test]
fn test_parse_jobs_response_custom_key() {
    let body = r#"{"jobs": []}"#;
    let jobs = parse_jobs_response(200, body, "jobs").expect("valid response");
    assert!(jobs.is_empty());
}

#[test]
fn test_parse_jobs_response_non_200_is_api_error_with_status() {
    for status in [404u16, 500, 503, 201] {
        let err = parse_jobs_response(status, r#"{"error": "nope"}"#, "results").unwrap_err();
        match err {
            FetchError::Api {
                status: got,
                snippet,
                ..
            } => {
                assert_eq!(got, status);
                assert!(snippet.contains("nope"), "snippet should carry body: {snippet}");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}

#[test]
fn test_parse_jobs_response_invalid_json_is_api_error() {
    let err = parse_jobs_response(200, "<html>maintenance</html>", "results").unwrap_err();
    match err {
        FetchError::Api { status, reason, .. } => {
            assert_eq!(status, 200);
            assert!(reason.contains("JSON"), "reason: {reason}");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn test_parse_jobs_response_missing_or_wrong_key_is_api_error() {
    let missing = parse_jobs_response(200, r#"{"items": []}"#, "results").unwrap_err();
    assert!(matches!(missing, FetchError::Api { ref reason, .. } if reason.contains("missing")));

    let not_list = parse_jobs_response(200, r#"{"results": {"a": 1}}"#, "results").unwrap_err();
    assert!(matches!(not_list, FetchError::Api { ref reason, .. } if reason.contains("not a list")));

    let not_object = parse_jobs_response(200, "[1, 2]", "results").unwrap_err();
    assert!(matches!(not_object, FetchError::Api { .. }));
}

#[test]
fn test_parse_jobs_response_truncates_long_bodies() {
    let body = "x".repeat(BODY_SNIPPET_CHARS * 5);
    let err = parse_jobs_response(502, &body, "results").unwrap_err();
    match err {
        FetchError::Api { snippet, .. } => {
            assert!(snippet.chars().count() <= BODY_SNIPPET_CHARS + 3);
            assert!(snippet.ends_with("..."));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_connection_refused_is_network_error() {
    // Reserve a port, then free it so nothing is listening there.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ApiConfig {
        base_url: Url::parse(&format!("http://127.0.0.1:{port}/api")).unwrap(),
        page: 1,
        results_key: "results".to_string(),
        timeout: Duration::from_secs(5),
    };
    let source = ApiJobSource::new(&config).expect("client builds");
    assert_eq!(source.url().path(), "/api/jobs");

    let err = source.fetch().await.unwrap_err();

    assert!(
        matches!(err, FetchError::Network { .. }),
        "expected Network error, got {err:?}"
    );
}
