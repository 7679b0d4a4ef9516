//! HTTP endpoint tests, driving the router directly.

#![allow(clippy::tests_outside_test_module)]

use std::{path::Path, sync::Arc};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::Value;
use sift::{SearchService, http};
use sift_config::{Config, RateLimitSettings};
use sift_document::Document;
use tower::ServiceExt;

const CONFIG: &str = r#"
[site.lang-en]
url = "http://localhost:1313/en/"

[site.lang-cs]
url = "http://localhost:1313/cs/"
"#;

fn documents() -> Vec<Document> {
    vec![
        Document {
            title: "Hello World".into(),
            content: vec!["Hello world, this is a test.".into()],
            url: "http://x/1".into(),
            tags: vec!["greeting".into()],
        },
        Document {
            title: "Cats".into(),
            content: vec!["Cats sit on the stove.".into(), "Dogs do not.".into()],
            url: "http://x/2".into(),
            tags: vec!["pets".into()],
        },
        Document {
            title: "More cats".into(),
            content: vec!["Cats again.".into()],
            url: "http://x/3".into(),
            tags: vec!["pets".into()],
        },
    ]
}

/// A service with `lang-en` indexed and `lang-cs` not yet built.
fn service() -> Arc<SearchService> {
    let config = Config::from_toml_str(CONFIG, Path::new("sift.toml")).unwrap();
    let service = SearchService::new(&config);
    service
        .registry()
        .get("lang-en")
        .unwrap()
        .publish(documents());
    Arc::new(service)
}

fn app() -> Router {
    http::router(service(), &RateLimitSettings::default())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> Value {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn fuzzy_query_returns_ranked_results() {
    let results = get_json(app(), "/?id=lang-en&q=helo%20wrld").await;
    let results = results.as_array().unwrap();
    assert!(!results.is_empty());

    let first = &results[0];
    assert_eq!(first["url"], "http://x/1");
    assert_eq!(first["title"], "Hello World");
    assert!(first["score"].as_f64().unwrap() < 0.5);
    assert!(first.get("summary").is_none());
    assert!(first.get("content").is_none());

    let matches = first["matches"].as_array().unwrap();
    assert_eq!(matches[0]["field"], "title");
    assert_eq!(matches[0]["spans"][0][0], 0);
}

#[tokio::test]
async fn full_mode_includes_document_and_summary() {
    let results = get_json(app(), "/?id=lang-en&q=stove&full=yes").await;
    let first = &results[0];
    assert_eq!(first["url"], "http://x/2");
    assert_eq!(first["content"][1], "Dogs do not.");
    assert_eq!(first["tags"][0], "pets");
    assert_eq!(first["summary"], "Cats sit on the stove.");
}

#[tokio::test]
async fn limit_caps_results() {
    let all = get_json(app(), "/?id=lang-en&q=cats").await;
    assert!(all.as_array().unwrap().len() >= 2);

    let limited = get_json(app(), "/?id=lang-en&q=cats&limit=1").await;
    assert_eq!(limited.as_array().unwrap().len(), 1);

    let fallback = get_json(app(), "/?id=lang-en&q=cats&limit=abc").await;
    assert_eq!(fallback, all);
}

#[tokio::test]
async fn missing_parameters_are_server_errors() {
    for uri in ["/?id=lang-en", "/?q=cats", "/?id=lang-en&q=", "/?id=lang-en&q=c", "/"] {
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert!(!body.is_empty());
    }
}

#[tokio::test]
async fn malformed_query_strings_are_server_errors() {
    for uri in ["/?id=lang-en&q=cats&q=dogs", "/?id=lang-en&id=lang-cs&q=cats"] {
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert!(body.contains("duplicate field"), "{body}");
    }
}

#[tokio::test]
async fn unknown_site_is_not_found() {
    let (status, body) = get(app(), "/?id=lang-de&q=cats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "site not found: lang-de");
}

#[tokio::test]
async fn unbuilt_site_is_unavailable() {
    let (status, _) = get(app(), "/?id=lang-cs&q=cats").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn no_matches_is_an_empty_array() {
    let results = get_json(app(), "/?id=lang-en&q=quokka").await;
    assert_eq!(results, Value::Array(Vec::new()));
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let app = http::router(service(), &RateLimitSettings {
        window_secs: 60,
        max_requests: 2,
    });

    for _ in 0..2 {
        let (status, _) = get(app.clone(), "/?id=lang-en&q=cats").await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = get(app.clone(), "/?id=lang-en&q=cats").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/?id=lang-en&q=cats")
                .header("origin", "http://localhost:1313")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
