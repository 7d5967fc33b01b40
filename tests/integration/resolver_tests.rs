//! Integration tests for the tiered resolver

use crate::common::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wilayah::config::Config;
use wilayah::resolver::{ManualClock, MemoryCache, Resolver};
use wilayah::storage::CacheKey;
use wilayah::{RegionCode, RegionEnvelope, RegionType, WilayahError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolver_config(dir: &TempDir, origin: &MockServer, mirror: Option<&MockServer>) -> Config {
    let mut config = test_config(dir, origin);
    if let Some(mirror) = mirror {
        config.mirror.base_url = Some(api_base(mirror).to_string());
        config.mirror.allow_loopback = true;
    }
    config
}

fn resolver(config: &Config) -> Resolver {
    let cache = Arc::new(MemoryCache::new(config.cache.ttl()));
    Resolver::from_config(config, cache).unwrap()
}

fn regencies_of(code: &str) -> CacheKey {
    CacheKey::parse("regencies", Some(code)).unwrap()
}

#[tokio::test]
async fn test_local_hit_makes_no_requests() {
    let origin = MockServer::start().await;
    let mirror = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let resolver = resolver(&resolver_config(&dir, &origin, Some(&mirror)));

    resolver
        .store()
        .write(&regencies_of("32"), REGENCIES_32.as_bytes())
        .await
        .unwrap();

    let envelope = resolver.resolve_key(&regencies_of("32")).await.unwrap();

    assert_eq!(envelope.len(), 2);
    assert!(origin.received_requests().await.unwrap().is_empty());
    assert!(mirror.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mirror_hit_is_written_through() {
    let origin = MockServer::start().await;
    let mirror = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/regencies/32.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REGENCIES_32))
        .expect(1)
        .mount(&mirror)
        .await;

    let dir = TempDir::new().unwrap();
    let resolver = resolver(&resolver_config(&dir, &origin, Some(&mirror)));

    let code = RegionCode::parse("32").unwrap();
    let envelope = resolver
        .resolve(RegionType::Regency, Some(code))
        .await
        .unwrap();

    assert!(envelope
        .codes()
        .all(|c| c.as_str().len() == 4 && c.as_str().starts_with("32")));
    assert!(origin.received_requests().await.unwrap().is_empty());

    // Stored pretty-printed, and decodes to the same listing
    let stored = resolver.store().read(&regencies_of("32")).await.unwrap();
    assert!(stored.contains(&b'\n'));
    assert_eq!(RegionEnvelope::from_slice(&stored).unwrap(), envelope);

    // Served from memory afterwards
    resolver.resolve_key(&regencies_of("32")).await.unwrap();
}

#[tokio::test]
async fn test_mirror_failure_falls_back_to_live_once() {
    let origin = MockServer::start().await;
    let mirror = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mirror)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROVINCES))
        .expect(1)
        .mount(&origin)
        .await;

    let dir = TempDir::new().unwrap();
    let resolver = resolver(&resolver_config(&dir, &origin, Some(&mirror)));

    let envelope = resolver.resolve_key(&CacheKey::provinces()).await.unwrap();

    assert_eq!(envelope.data[0].name, "JAWA BARAT");
    assert!(resolver.store().exists(&CacheKey::provinces()).await);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&origin)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/provinces.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROVINCES))
        .expect(1)
        .mount(&origin)
        .await;

    let dir = TempDir::new().unwrap();
    let resolver = resolver(&resolver_config(&dir, &origin, None));

    let err = resolver
        .resolve_key(&CacheKey::provinces())
        .await
        .unwrap_err();
    assert!(matches!(err, WilayahError::ServiceUnavailable(_)));
    assert!(!resolver.store().exists(&CacheKey::provinces()).await);

    let envelope = resolver.resolve_key(&CacheKey::provinces()).await.unwrap();
    assert_eq!(envelope.len(), 1);
}

#[tokio::test]
async fn test_loopback_mirror_is_skipped_by_default() {
    let origin = MockServer::start().await;
    let mirror = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PROVINCES))
        .expect(0)
        .mount(&mirror)
        .await;
    mount_listing(&origin, "provinces.json", PROVINCES).await;

    let dir = TempDir::new().unwrap();
    let mut config = resolver_config(&dir, &origin, Some(&mirror));
    config.mirror.allow_loopback = false;
    let resolver = resolver(&config);

    assert!(!resolver.has_mirror());
    resolver.resolve_key(&CacheKey::provinces()).await.unwrap();
}

#[tokio::test]
async fn test_memory_entry_expires_after_ttl() {
    let origin = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = resolver_config(&dir, &origin, None);

    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(MemoryCache::with_clock(config.cache.ttl(), clock.clone()));
    let resolver = Resolver::from_config(&config, cache).unwrap();

    let key = CacheKey::provinces();
    resolver.store().write(&key, PROVINCES.as_bytes()).await.unwrap();
    let first = resolver.resolve_key(&key).await.unwrap();

    let updated = r#"{"data":[{"code":"11","name":"ACEH"},{"code":"32","name":"JAWA BARAT"}]}"#;
    resolver.store().write(&key, updated.as_bytes()).await.unwrap();

    clock.advance(chrono::Duration::seconds(3599));
    assert_eq!(resolver.resolve_key(&key).await.unwrap(), first);

    clock.advance(chrono::Duration::seconds(1));
    assert_eq!(resolver.resolve_key(&key).await.unwrap().len(), 2);
    assert!(origin.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_misses_share_one_fetch() {
    let origin = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/regencies/32.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(REGENCIES_32)
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&origin)
        .await;

    let dir = TempDir::new().unwrap();
    let resolver = Arc::new(resolver(&resolver_config(&dir, &origin, None)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve_key(&regencies_of("32")).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().len(), 2);
    }
}
