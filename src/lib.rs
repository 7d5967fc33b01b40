//! Wilayah: administrative-geography reference data for Indonesia
//!
//! This crate mirrors the province → regency → district → village tree from a
//! slow third-party origin API into a durable on-disk cache, and serves single
//! lookups through a tiered resolver (memory → disk → CDN mirror → origin).

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod output;
pub mod region;
pub mod resolver;
pub mod server;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Wilayah operations
#[derive(Debug, Error)]
pub enum WilayahError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Region error: {0}")]
    Region(#[from] RegionError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors produced by the retrying fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    /// The origin answered with a 4xx; the request will never succeed as-is
    #[error("Client error {status} for {url}")]
    Client { url: String, status: u16 },

    /// Timeout, connection failure, 5xx or another non-success answer
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Every attempt failed with a transport-class error
    #[error("Gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: u32,
        last: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl FetchError {
    /// Returns true if retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Durable cache errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No cache entry for {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode {key}: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },
}

/// Region code and payload validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("Invalid region code '{0}'")]
    InvalidCode(String),

    #[error("Code '{code}' is not a {expected} code")]
    UnexpectedWidth { code: String, expected: &'static str },

    #[error("Code '{code}' does not belong to parent '{parent}'")]
    PrefixMismatch { code: String, parent: String },

    #[error("Unknown region collection '{0}'")]
    UnknownType(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),
}

/// Result type alias for Wilayah operations
pub type Result<T> = std::result::Result<T, WilayahError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for durable cache operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// Re-export commonly used types
pub use config::Config;
pub use region::{RegionCode, RegionEnvelope, RegionNode, RegionType};
pub use resolver::{MemoryCache, Resolver};
pub use storage::{CacheKey, FsStore};
