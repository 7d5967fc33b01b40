//! Integration tests for the retrying fetcher

use crate::common::*;
use std::time::Duration;
use url::Url;
use wilayah::fetch::RetryPolicy;
use wilayah::FetchError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provinces_url(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api/provinces.json", server.uri())).unwrap()
}

#[tokio::test]
async fn test_recovers_after_two_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROVINCES))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client()
        .fetch(
            &provinces_url(&server),
            Duration::from_secs(5),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.attempts, 3);
    assert_eq!(
        response.backoff,
        vec![Duration::from_millis(500), Duration::from_millis(1000)]
    );
    assert_eq!(response.envelope().unwrap().len(), 1);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client()
        .fetch(
            &provinces_url(&server),
            Duration::from_secs(5),
            &RetryPolicy::default(),
        )
        .await
        .unwrap_err();

    match err {
        FetchError::Client { status, .. } => assert_eq!(status, 404),
        other => panic!("expected a client error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let err = test_client()
        .fetch(
            &provinces_url(&server),
            Duration::from_secs(5),
            &RetryPolicy::new(3, Duration::from_millis(10)),
        )
        .await
        .unwrap_err();

    match err {
        FetchError::Exhausted { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch(
            &provinces_url(&server),
            Duration::from_millis(200),
            &RetryPolicy::new(2, Duration::from_millis(10)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Exhausted { attempts: 2, .. }));
}
