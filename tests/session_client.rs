//! Session client behaviour against a mock server.

mod common;

use std::time::{Duration, Instant};

use review_crawler::error::AppError;
use review_crawler::services::{PageFetcher, SessionClient};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::test_config;

#[tokio::test]
async fn test_body_decoded_as_utf8_despite_charset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subject/1/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes("<h1>三体</h1>".as_bytes())
                .insert_header("content-type", "text/html; charset=ISO-8859-1"),
        )
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let session = SessionClient::new(&test_config(&server.uri(), out.path())).unwrap();
    let body = session
        .get(&format!("{}/subject/1/", server.uri()), None)
        .await
        .unwrap();

    assert_eq!(body, "<h1>三体</h1>");
}

#[tokio::test]
async fn test_default_headers_and_referer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .and(header("referer", "https://ref.example.com/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let session = SessionClient::new(&test_config(&server.uri(), out.path())).unwrap();
    let body = session
        .get(&server.uri(), Some("https://ref.example.com/page"))
        .await
        .unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let session = SessionClient::new(&test_config(&server.uri(), out.path())).unwrap();
    let err = session.get(&server.uri(), None).await.unwrap_err();

    assert!(matches!(err, AppError::Status { status: 403, .. }));
}

#[tokio::test]
async fn test_delay_follows_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let mut config = test_config(&server.uri(), out.path());
    config.crawler.min_delay_ms = 60;
    config.crawler.max_delay_ms = 80;
    let session = SessionClient::new(&config).unwrap();

    let started = Instant::now();
    session
        .get(&format!("{}/ok", server.uri()), None)
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(60));

    let started = Instant::now();
    assert!(
        session
            .get(&format!("{}/missing", server.uri()), None)
            .await
            .is_err()
    );
    assert!(started.elapsed() >= Duration::from_millis(60));
}
