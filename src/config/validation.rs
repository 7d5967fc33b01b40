use crate::config::types::{
    CacheConfig, Config, LiveConfig, MirrorConfig, OriginConfig, ServerConfig, StorageConfig,
    TlsConfig, UserAgentConfig,
};
use crate::url::parse_base_url;
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_origin_config(&config.origin)?;
    validate_mirror_config(&config.mirror)?;
    validate_live_config(&config.live)?;
    validate_storage_config(&config.storage)?;
    validate_tls_config(&config.tls)?;
    validate_cache_config(&config.cache)?;
    validate_server_config(&config.server)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

fn validate_origin_config(config: &OriginConfig) -> Result<(), ConfigError> {
    parse_base_url(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin base-url: {}", e)))?;

    validate_timeout("origin.timeout-secs", config.timeout_secs)?;
    validate_retries("origin.max-retries", config.max_retries)?;

    if config.initial_backoff_ms == 0 {
        return Err(ConfigError::Validation(
            "origin.initial-backoff-ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_mirror_config(config: &MirrorConfig) -> Result<(), ConfigError> {
    if let Some(base_url) = &config.base_url {
        parse_base_url(base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid mirror base-url: {}", e)))?;
    }

    validate_timeout("mirror.timeout-secs", config.timeout_secs)
}

fn validate_live_config(config: &LiveConfig) -> Result<(), ConfigError> {
    validate_timeout("live.timeout-secs", config.timeout_secs)?;
    validate_retries("live.max-retries", config.max_retries)
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.public_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage.public-root cannot be empty".to_string(),
        ));
    }

    if config.private_root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage.private-root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_tls_config(config: &TlsConfig) -> Result<(), ConfigError> {
    parse_base_url(&config.ca_bundle_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid tls ca-bundle-url: {}", e)))?;

    validate_timeout("tls.timeout-secs", config.timeout_secs)
}

fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.ttl_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "cache.ttl-secs must be >= 1, got {}",
            config.ttl_secs
        )));
    }

    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("server.bind '{}' is not a socket address: {}", config.bind, e))
    })?;

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Name: non-empty, alphanumeric + hyphens only
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent.name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent.name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if config.version.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent.version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        url::Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

fn validate_timeout(field: &str, secs: u64) -> Result<(), ConfigError> {
    if secs < 1 {
        return Err(ConfigError::Validation(format!(
            "{} must be >= 1 second, got {}",
            field, secs
        )));
    }
    Ok(())
}

fn validate_retries(field: &str, retries: u32) -> Result<(), ConfigError> {
    if retries < 1 {
        return Err(ConfigError::Validation(format!(
            "{} must be >= 1, got {}",
            field, retries
        )));
    }
    Ok(())
}
