//! Integration tests for the crawler

use crate::common::*;
use tempfile::TempDir;
use wilayah::crawler::{run_crawl, CrawlPlan, CrawlStats, CrawlStatus};
use wilayah::storage::{CacheKey, FsStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn plan_all() -> CrawlPlan {
    CrawlPlan::from_flags(true, None, None, None, false).unwrap()
}

#[tokio::test]
async fn test_full_crawl_stores_every_listing() {
    let server = MockServer::start().await;
    mount_tree(&server).await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());

    let outcome = crawler(&server, store.clone()).run(&plan_all()).await;

    assert_eq!(outcome.status, CrawlStatus::Completed);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        outcome.stats,
        CrawlStats {
            skipped: 0,
            downloaded: 6,
            failed: 0
        }
    );
    assert_eq!(
        stored_files(&store.dir()),
        vec![
            "districts_3201.json",
            "districts_3273.json",
            "provinces.json",
            "regencies_32.json",
            "villages_3201010.json",
            "villages_3273010.json",
        ]
    );

    // Raw bodies are stored verbatim
    let villages = std::fs::read_to_string(store.dir().join("villages_3201010.json")).unwrap();
    assert_eq!(villages, VILLAGES_3201010);
}

#[tokio::test]
async fn test_second_run_makes_no_requests() {
    let server = MockServer::start().await;
    mount_tree(&server).await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());

    crawler(&server, store.clone()).run(&plan_all()).await;
    let requests_after_first = server.received_requests().await.unwrap().len();
    let bytes_after_first = std::fs::read(store.dir().join("regencies_32.json")).unwrap();

    let outcome = crawler(&server, store.clone()).run(&plan_all()).await;

    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_after_first
    );
    assert_eq!(outcome.stats.downloaded, 0);
    assert_eq!(outcome.stats.skipped, 6);
    assert_eq!(
        std::fs::read(store.dir().join("regencies_32.json")).unwrap(),
        bytes_after_first
    );
}

#[tokio::test]
async fn test_resume_fetches_only_missing_listings() {
    let server = MockServer::start().await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    store
        .write(&CacheKey::provinces(), PROVINCES.as_bytes())
        .await
        .unwrap();
    store
        .write(
            &CacheKey::parse("regencies", Some("32")).unwrap(),
            REGENCIES_32.as_bytes(),
        )
        .await
        .unwrap();
    store
        .write(
            &CacheKey::parse("districts", Some("3201")).unwrap(),
            DISTRICTS_3201.as_bytes(),
        )
        .await
        .unwrap();

    for stored in ["provinces.json", "regencies/32.json", "districts/3201.json"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/{}", stored)))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
    }
    for (endpoint, body) in [
        ("districts/3273.json", DISTRICTS_3273),
        ("villages/3201010.json", VILLAGES_3201010),
        ("villages/3273010.json", VILLAGES_3273010),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/api/{}", endpoint)))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let outcome = crawler(&server, store.clone()).run(&plan_all()).await;

    assert_eq!(outcome.stats.skipped, 3);
    assert_eq!(outcome.stats.downloaded, 3);
    assert_eq!(stored_files(&store.dir()).len(), 6);
}

#[tokio::test]
async fn test_force_refetches_stored_listings() {
    let server = MockServer::start().await;
    mount_listing(&server, "provinces.json", PROVINCES).await;
    Mock::given(method("GET"))
        .and(path("/api/villages/3201010.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VILLAGES_3201010))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let key = CacheKey::parse("villages", Some("3201010")).unwrap();
    store.write(&key, br#"{"data":[]}"#).await.unwrap();

    let plan = CrawlPlan::from_flags(false, None, None, Some("3201010"), true).unwrap();
    let outcome = crawler(&server, store.clone()).run(&plan).await;

    assert_eq!(outcome.stats.downloaded, 2);
    assert_eq!(store.read(&key).await.unwrap(), VILLAGES_3201010.as_bytes());
}

#[tokio::test]
async fn test_unreadable_stored_listing_is_downloaded_again() {
    let server = MockServer::start().await;
    mount_listing(&server, "provinces.json", PROVINCES).await;
    Mock::given(method("GET"))
        .and(path("/api/villages/3201010.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(VILLAGES_3201010))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    let key = CacheKey::parse("villages", Some("3201010")).unwrap();
    store.write(&key, b"{\"data\": [trunc").await.unwrap();

    let plan = CrawlPlan::from_flags(false, None, None, Some("3201010"), false).unwrap();
    let outcome = crawler(&server, store.clone()).run(&plan).await;

    // Only a listing served from disk counts as skipped
    assert_eq!(outcome.stats.skipped, 0);
    assert_eq!(outcome.stats.downloaded, 2);
    assert_eq!(store.read(&key).await.unwrap(), VILLAGES_3201010.as_bytes());
}

#[tokio::test]
async fn test_district_flag_writes_only_its_villages() {
    let server = MockServer::start().await;
    mount_tree(&server).await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());
    store
        .write(&CacheKey::provinces(), PROVINCES.as_bytes())
        .await
        .unwrap();

    let plan = CrawlPlan::from_flags(false, None, None, Some("3201010"), false).unwrap();
    let outcome = crawler(&server, store.clone()).run(&plan).await;

    assert_eq!(outcome.status, CrawlStatus::Completed);
    assert_eq!(
        stored_files(&store.dir()),
        vec!["provinces.json", "villages_3201010.json"]
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/api/villages/3201010.json");
}

#[tokio::test]
async fn test_no_flags_only_ensures_provinces() {
    let server = MockServer::start().await;
    mount_tree(&server).await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());

    let plan = CrawlPlan::from_flags(false, None, None, None, false).unwrap();
    let outcome = crawler(&server, store.clone()).run(&plan).await;

    assert_eq!(outcome.status, CrawlStatus::NothingToDo);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(stored_files(&store.dir()), vec!["provinces.json"]);
}

#[tokio::test]
async fn test_node_failure_does_not_stop_siblings() {
    let server = MockServer::start().await;
    mount_listing(&server, "provinces.json", PROVINCES).await;
    mount_listing(&server, "regencies/32.json", REGENCIES_32).await;
    Mock::given(method("GET"))
        .and(path("/api/districts/3201.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_listing(&server, "districts/3273.json", DISTRICTS_3273).await;
    mount_listing(&server, "villages/3273010.json", VILLAGES_3273010).await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());

    let outcome = crawler(&server, store.clone()).run(&plan_all()).await;

    assert_eq!(outcome.status, CrawlStatus::Completed);
    assert_eq!(outcome.stats.failed, 1);
    assert!(store.dir().join("villages_3273010.json").is_file());
    assert!(!store.dir().join("districts_3201.json").exists());
}

#[tokio::test]
async fn test_mismatched_payload_is_not_stored() {
    let server = MockServer::start().await;
    mount_listing(&server, "provinces.json", PROVINCES).await;
    // Codes that belong to another regency
    mount_listing(
        &server,
        "districts/3201.json",
        r#"{"data":[{"code":"3273010","name":"SUKASARI"}]}"#,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let store = FsStore::new(dir.path());

    let plan = CrawlPlan::from_flags(false, None, Some("3201"), None, false).unwrap();
    let outcome = crawler(&server, store.clone()).run(&plan).await;

    assert_eq!(outcome.stats.failed, 1);
    assert_eq!(stored_files(&store.dir()), vec!["provinces.json"]);
}

#[tokio::test]
async fn test_provinces_failure_aborts_with_exit_code_1() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cacert.pem"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);

    let outcome = run_crawl(&config, &plan_all()).await.unwrap();

    assert_eq!(outcome.status, CrawlStatus::Aborted);
    assert_eq!(outcome.exit_code(), 1);
    assert!(stored_files(&dir.path().join("public").join("wilayah")).is_empty());
}

#[tokio::test]
async fn test_run_crawl_proceeds_without_ca_bundle() {
    let server = MockServer::start().await;
    mount_tree(&server).await;
    Mock::given(method("GET"))
        .and(path("/cacert.pem"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir, &server);

    let plan = CrawlPlan::from_flags(false, Some("32"), None, None, false).unwrap();
    let outcome = run_crawl(&config, &plan).await.unwrap();

    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.stats.downloaded, 6);
    assert!(!config.storage.ca_bundle_path().exists());
}
