//! Configuration module for Wilayah
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is valid.
//!
//! # Example
//!
//! ```no_run
//! use wilayah::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("wilayah.toml")).unwrap();
//! println!("Resolver TTL: {}s", config.cache.ttl_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CacheConfig, Config, LiveConfig, MirrorConfig, OriginConfig, ServerConfig, StorageConfig,
    TlsConfig, UserAgentConfig, DEFAULT_CA_BUNDLE_URL, DEFAULT_ORIGIN_URL,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_or_default, load_config_with_hash, parse_config,
};
pub use validation::validate;
