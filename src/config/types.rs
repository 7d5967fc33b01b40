use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default origin API base URL
pub const DEFAULT_ORIGIN_URL: &str = "https://wilayah.id/api";

/// Default upstream CA bundle location
pub const DEFAULT_CA_BUNDLE_URL: &str = "https://curl.se/ca/cacert.pem";

/// Main configuration structure for Wilayah
///
/// Every section is optional; missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub origin: OriginConfig,
    pub mirror: MirrorConfig,
    pub live: LiveConfig,
    pub storage: StorageConfig,
    pub tls: TlsConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// Origin API settings used by the crawler
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Base URL of the origin API
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total attempts per request, including the first one
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// First backoff delay (milliseconds); doubles after every failed attempt
    #[serde(rename = "initial-backoff-ms")]
    pub initial_backoff_ms: u64,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ORIGIN_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 500,
        }
    }
}

impl OriginConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

/// Optional CDN mirror consulted by the resolver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Base URL of the mirror; `None` disables the tier
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Probe timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Allow a mirror on localhost/loopback (local development only)
    #[serde(rename = "allow-loopback")]
    pub allow_loopback: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 5,
            allow_loopback: false,
        }
    }
}

impl MirrorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Live origin fallback used by the resolver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total attempts per lookup
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 1,
        }
    }
}

impl LiveConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Filesystem roots
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Public-readable root; region payloads live in `<public-root>/wilayah/`
    #[serde(rename = "public-root")]
    pub public_root: PathBuf,

    /// Private root; the CA bundle lives in `<private-root>/certs/cacert.pem`
    #[serde(rename = "private-root")]
    pub private_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_root: PathBuf::from("storage/app/public"),
            private_root: PathBuf::from("storage/app"),
        }
    }
}

impl StorageConfig {
    /// Location of the downloaded CA bundle
    pub fn ca_bundle_path(&self) -> PathBuf {
        self.private_root.join("certs").join("cacert.pem")
    }
}

/// Certificate bootstrap policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Where to download the CA bundle from
    #[serde(rename = "ca-bundle-url")]
    pub ca_bundle_url: String,

    /// Download timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Permit unverified TLS when no bundle can be obtained
    #[serde(rename = "insecure-fallback")]
    pub insecure_fallback: bool,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            ca_bundle_url: DEFAULT_CA_BUNDLE_URL.to_string(),
            timeout_secs: 30,
            insecure_fallback: true,
        }
    }
}

impl TlsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// In-memory resolver cache
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live of memoized lookups (seconds)
    #[serde(rename = "ttl-secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// HTTP query surface
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

/// User agent identification
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    pub name: String,
    pub version: String,

    /// URL with information about the operator
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "wilayah".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.name, self.version, url),
            None => format!("{}/{}", self.name, self.version),
        }
    }
}
