//! Shared fixtures for the integration tests

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wilayah::config::{Config, UserAgentConfig};
use wilayah::crawler::Crawler;
use wilayah::fetch::{build_http_client, Fetcher, RetryPolicy};
use wilayah::storage::FsStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROVINCES: &str = r#"{"data":[{"code":"32","name":"JAWA BARAT"}]}"#;
pub const REGENCIES_32: &str =
    r#"{"data":[{"code":"3201","name":"KABUPATEN BOGOR"},{"code":"3273","name":"KOTA BANDUNG"}]}"#;
pub const DISTRICTS_3201: &str = r#"{"data":[{"code":"3201010","name":"JONGGOL"}]}"#;
pub const DISTRICTS_3273: &str = r#"{"data":[{"code":"3273010","name":"SUKASARI"}]}"#;
pub const VILLAGES_3201010: &str = r#"{"data":[{"code":"3201010001","name":"SUKAJADI"}]}"#;
pub const VILLAGES_3273010: &str = r#"{"data":[{"code":"3273010001","name":"GEGERKALONG"}]}"#;

/// Every listing of the fixture tree, keyed by endpoint
pub const TREE: [(&str, &str); 6] = [
    ("provinces.json", PROVINCES),
    ("regencies/32.json", REGENCIES_32),
    ("districts/3201.json", DISTRICTS_3201),
    ("districts/3273.json", DISTRICTS_3273),
    ("villages/3201010.json", VILLAGES_3201010),
    ("villages/3273010.json", VILLAGES_3273010),
];

/// Mounts `body` at `/api/{endpoint}`
pub async fn mount_listing(server: &MockServer, endpoint: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{}", endpoint)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Mounts the whole fixture tree
pub async fn mount_tree(server: &MockServer) {
    for (endpoint, body) in TREE {
        mount_listing(server, endpoint, body).await;
    }
}

pub fn api_base(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api", server.uri())).unwrap()
}

pub fn test_client() -> Fetcher {
    Fetcher::new(build_http_client(&UserAgentConfig::default()).unwrap())
}

/// A crawler against `server` with a short backoff
pub fn crawler(server: &MockServer, store: FsStore) -> Crawler {
    Crawler::new(
        test_client(),
        store,
        api_base(server),
        Duration::from_secs(5),
        RetryPolicy::new(3, Duration::from_millis(10)),
    )
}

/// A configuration with both storage roots inside `dir` and the origin on `server`
pub fn test_config(dir: &TempDir, server: &MockServer) -> Config {
    let mut config = Config::default();
    config.storage.public_root = dir.path().join("public");
    config.storage.private_root = dir.path().join("private");
    config.origin.base_url = api_base(server).to_string();
    config.origin.initial_backoff_ms = 10;
    config.tls.ca_bundle_url = format!("{}/cacert.pem", server.uri());
    config.tls.timeout_secs = 2;
    config
}

/// Sorted file names in the store directory
pub fn stored_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}
