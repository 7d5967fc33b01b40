//! Tiered lookup: memory → durable store → CDN mirror → live origin
//!
//! Every tier that produces a listing populates the tiers above it. Failures
//! are never memoized, so the next lookup retries the whole chain.

use crate::config::{Config, UserAgentConfig};
use crate::fetch::{build_http_client, build_origin_client, CertificateBundle, Fetcher, RetryPolicy};
use crate::region::{RegionCode, RegionEnvelope, RegionType};
use crate::resolver::MemoryCache;
use crate::storage::{CacheKey, FsStore};
use crate::url::{is_local_url, join_endpoint, parse_base_url};
use crate::{FetchError, WilayahError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Resolves region listings for the query surface
pub struct Resolver {
    cache: Arc<MemoryCache<RegionEnvelope>>,
    store: FsStore,

    mirror: Option<MirrorTier>,
    live: LiveTier,

    /// One lock per key so concurrent misses trigger a single remote fetch
    inflight: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

struct MirrorTier {
    base: Url,
    fetcher: Fetcher,
    timeout: Duration,
}

struct LiveTier {
    origin: Url,
    timeout: Duration,
    policy: RetryPolicy,
    bundle_path: PathBuf,
    insecure_fallback: bool,
    user_agent: UserAgentConfig,
}

impl Resolver {
    /// Builds a resolver from configuration around a shared memory cache
    ///
    /// A mirror pointing at a loopback address is ignored unless
    /// `mirror.allow-loopback` is set.
    pub fn from_config(
        config: &Config,
        cache: Arc<MemoryCache<RegionEnvelope>>,
    ) -> Result<Self, WilayahError> {
        let origin = parse_base_url(&config.origin.base_url)?;

        let mirror = match config.mirror.base_url.as_deref() {
            Some(raw) => {
                let base = parse_base_url(raw)?;
                if is_local_url(&base) && !config.mirror.allow_loopback {
                    tracing::warn!(
                        "Mirror {} points at a local address; CDN tier disabled",
                        base
                    );
                    None
                } else {
                    let client =
                        build_http_client(&config.user_agent).map_err(FetchError::Build)?;
                    Some(MirrorTier {
                        base,
                        fetcher: Fetcher::new(client),
                        timeout: config.mirror.timeout(),
                    })
                }
            }
            None => None,
        };

        Ok(Self {
            cache,
            store: FsStore::new(&config.storage.public_root),
            mirror,
            live: LiveTier {
                origin,
                timeout: config.live.timeout(),
                policy: RetryPolicy::new(
                    config.live.max_retries,
                    config.origin.initial_backoff(),
                ),
                bundle_path: config.storage.ca_bundle_path(),
                insecure_fallback: config.tls.insecure_fallback,
                user_agent: config.user_agent.clone(),
            },
            inflight: Mutex::new(HashMap::new()),
        })
    }

    /// Whether a CDN mirror is in use
    pub fn has_mirror(&self) -> bool {
        self.mirror.is_some()
    }

    pub fn cache(&self) -> &Arc<MemoryCache<RegionEnvelope>> {
        &self.cache
    }

    pub fn store(&self) -> &FsStore {
        &self.store
    }

    /// Resolves the listing of `collection` under `code`
    ///
    /// `code` must be `None` for provinces and the parent's code otherwise.
    pub async fn resolve(
        &self,
        collection: RegionType,
        code: Option<RegionCode>,
    ) -> Result<RegionEnvelope, WilayahError> {
        let key = CacheKey::new(collection, code)?;
        self.resolve_key(&key).await
    }

    /// Resolves a listing by cache key
    ///
    /// # Returns
    ///
    /// * `Ok(RegionEnvelope)` - From the first tier that produced it
    /// * `Err(WilayahError::ServiceUnavailable)` - Every tier failed
    pub async fn resolve_key(&self, key: &CacheKey) -> Result<RegionEnvelope, WilayahError> {
        let memory_key = key.memory_key();
        if let Some(envelope) = self.cache.get(&memory_key) {
            tracing::debug!("[MEMORY HIT] {}", memory_key);
            return Ok(envelope);
        }

        let lock = self.inflight_lock(key);
        let _guard = lock.lock().await;

        // Another caller may have filled the cache while we waited
        if let Some(envelope) = self.cache.get(&memory_key) {
            return Ok(envelope);
        }

        match self.resolve_tiers(key).await {
            Some(envelope) => {
                self.cache.insert(memory_key, envelope.clone());
                Ok(envelope)
            }
            None => {
                tracing::error!("[FAILURE] All methods failed for: {}", key.endpoint());
                Err(WilayahError::ServiceUnavailable(key.endpoint()))
            }
        }
    }

    async fn resolve_tiers(&self, key: &CacheKey) -> Option<RegionEnvelope> {
        if let Some(envelope) = self.from_local(key).await {
            return Some(envelope);
        }

        if let Some(mirror) = &self.mirror {
            tracing::info!("[CDN FETCH] Trying CDN: {}", key.endpoint());
            if let Some(envelope) = fetch_listing(
                &mirror.fetcher,
                &mirror.base,
                key,
                mirror.timeout,
                &RetryPolicy::single_attempt(),
            )
            .await
            {
                self.save_to_local(key, &envelope).await;
                return Some(envelope);
            }
        }

        tracing::warn!("[LIVE FETCH] CDN failed or unavailable. Trying live API...");
        let envelope = self.from_live(key).await?;
        self.save_to_local(key, &envelope).await;
        Some(envelope)
    }

    async fn from_local(&self, key: &CacheKey) -> Option<RegionEnvelope> {
        if !self.store.exists(key).await {
            return None;
        }

        match self.store.read_envelope(key).await {
            Ok(envelope) => {
                tracing::info!("[LOCAL HIT] {}", key.file_name());
                Some(envelope)
            }
            Err(e) => {
                tracing::warn!("Ignoring unusable local file {}: {}", key.file_name(), e);
                None
            }
        }
    }

    async fn from_live(&self, key: &CacheKey) -> Option<RegionEnvelope> {
        let live = &self.live;
        let bundle = CertificateBundle::probe(&live.bundle_path);

        let client =
            match build_origin_client(&live.user_agent, &bundle, live.insecure_fallback).await {
                Ok(client) => client,
                Err(e) => {
                    tracing::error!("[LIVE ERROR] {}", e);
                    return None;
                }
            };

        fetch_listing(
            &Fetcher::new(client),
            &live.origin,
            key,
            live.timeout,
            &live.policy,
        )
        .await
    }

    /// Writes a remotely obtained listing to the durable store
    ///
    /// A failed write is logged; the listing is still served.
    async fn save_to_local(&self, key: &CacheKey, envelope: &RegionEnvelope) {
        let bytes = match envelope.to_pretty_json() {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Could not encode {} for saving: {}", key, e);
                return;
            }
        };

        match self.store.write(key, &bytes).await {
            Ok(path) => tracing::info!("[SAVED] File saved to: {}", path.display()),
            Err(e) => tracing::warn!("Could not save {}: {}", key, e),
        }
    }

    fn inflight_lock(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        inflight.entry(key.clone()).or_default().clone()
    }
}

/// Fetches and validates one listing from `base`
async fn fetch_listing(
    fetcher: &Fetcher,
    base: &Url,
    key: &CacheKey,
    timeout: Duration,
    policy: &RetryPolicy,
) -> Option<RegionEnvelope> {
    let url = match join_endpoint(base, &key.endpoint()) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("[FETCH ERROR] {}: {}", key.endpoint(), e);
            return None;
        }
    };

    let response = match fetcher.fetch(&url, timeout, policy).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("[FETCH ERROR] {}", e);
            return None;
        }
    };

    let envelope = match response.envelope() {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("[FETCH ERROR] Malformed payload from {}: {}", url, e);
            return None;
        }
    };

    match envelope.validate_children(key.collection(), key.parent()) {
        Ok(()) => Some(envelope),
        Err(e) => {
            tracing::warn!("[FETCH ERROR] Unexpected payload from {}: {}", url, e);
            None
        }
    }
}
