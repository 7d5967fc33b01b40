//! Crawler coordinator - hierarchical traversal of the region tree
//!
//! This module walks provinces → regencies → districts → villages against the
//! origin API, persisting every listing into the durable store. Listings that
//! are already stored are skipped unless the crawl is forced, which makes an
//! interrupted crawl resumable by simply running it again.

use crate::crawler::{CrawlPlan, CrawlTarget};
use crate::fetch::{Fetcher, RetryPolicy};
use crate::region::{RegionCode, RegionEnvelope};
use crate::storage::{CacheKey, FsStore};
use crate::url::join_endpoint;
use std::time::Duration;
use url::Url;

/// How a crawl run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// The requested subtrees were walked (individual nodes may have failed)
    Completed,

    /// No crawl flag was given; only the provinces list was ensured
    NothingToDo,

    /// The provinces list could not be obtained
    Aborted,
}

/// Per-node counters, reported in the final log line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Listings served from the durable store
    pub skipped: u64,

    /// Listings fetched from the origin and stored
    pub downloaded: u64,

    /// Listings that could not be fetched or stored
    pub failed: u64,
}

/// Result of [`Crawler::run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub status: CrawlStatus,
    pub stats: CrawlStats,
}

impl CrawlOutcome {
    /// Process exit status: 1 when the run was aborted, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        match self.status {
            CrawlStatus::Aborted => 1,
            CrawlStatus::Completed | CrawlStatus::NothingToDo => 0,
        }
    }
}

/// Sequential, resumable crawler over the origin API
pub struct Crawler {
    fetcher: Fetcher,
    store: FsStore,
    origin: Url,
    timeout: Duration,
    policy: RetryPolicy,
    force: bool,
    stats: CrawlStats,
}

impl Crawler {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetcher configured with the origin's TLS material
    /// * `store` - Durable store receiving the payloads
    /// * `origin` - Origin API base URL
    /// * `timeout` - Per-request timeout
    /// * `policy` - Retry policy for every origin request
    pub fn new(
        fetcher: Fetcher,
        store: FsStore,
        origin: Url,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            store,
            origin,
            timeout,
            policy,
            force: false,
            stats: CrawlStats::default(),
        }
    }

    /// Runs a crawl
    ///
    /// 1. Ensures the provinces list (fatal on failure)
    /// 2. Walks every target of the plan, in order
    /// 3. Reports counters
    pub async fn run(&mut self, plan: &CrawlPlan) -> CrawlOutcome {
        self.force = plan.force;
        self.stats = CrawlStats::default();

        tracing::info!("[START] Starting Wilayah Data Fetch Process");

        let Some(provinces) = self.get_or_fetch(&CacheKey::provinces(), "All Provinces").await
        else {
            tracing::error!("[CRITICAL] Could not fetch provinces. Aborting process.");
            return self.outcome(CrawlStatus::Aborted);
        };

        let targets = plan.targets();
        if targets.is_empty() {
            tracing::info!(
                "[INFO] Nothing to do. Use --all to fetch everything, or specific flags like --province=XX"
            );
            return self.outcome(CrawlStatus::NothingToDo);
        }

        for target in targets {
            match target {
                CrawlTarget::District(code) => {
                    let label = format!("Villages for District {}", code);
                    self.fetch_children(&code, &label).await;
                }
                CrawlTarget::Regency(code) => {
                    let label = format!("Districts for Regency {}", code);
                    self.crawl_regency(&code, &label).await;
                }
                CrawlTarget::Province(code) => {
                    let label = format!("Regencies for Province {}", code);
                    self.crawl_province(&code, &label).await;
                }
                CrawlTarget::All => self.crawl_all(&provinces).await,
            }
        }

        let outcome = self.outcome(CrawlStatus::Completed);
        tracing::info!(
            "[SUCCESS] Fetch finished: {} downloaded, {} skipped, {} failed",
            outcome.stats.downloaded,
            outcome.stats.skipped,
            outcome.stats.failed
        );
        outcome
    }

    /// Walks every province from the top-level listing
    async fn crawl_all(&mut self, provinces: &RegionEnvelope) {
        tracing::info!("[MODE] ALL - Recursive Download Active");

        for province in &provinces.data {
            tracing::info!(
                "[PROCESSING] Province: [{}] {}",
                province.code,
                province.name
            );
            let label = format!("Regencies of {}", province.name);
            self.crawl_province(&province.code, &label).await;
        }
    }

    /// Regencies of a province, then each regency's subtree
    async fn crawl_province(&mut self, province: &RegionCode, label: &str) {
        let Some(regencies) = self.fetch_children(province, label).await else {
            return;
        };

        for regency in &regencies.data {
            let label = format!("Districts of {}", regency.name);
            self.crawl_regency(&regency.code, &label).await;
            // The regency's district listing went out of scope with the call
            // above; only the province-level listing stays resident.
            tracing::debug!("Released subtree of regency {}", regency.code);
        }
    }

    /// Districts of a regency, then the villages of each district
    async fn crawl_regency(&mut self, regency: &RegionCode, label: &str) {
        let Some(districts) = self.fetch_children(regency, label).await else {
            return;
        };

        for district in &districts.data {
            let label = format!("Villages of {}", district.code);
            self.fetch_children(&district.code, &label).await;
        }
    }

    async fn fetch_children(&mut self, parent: &RegionCode, label: &str) -> Option<RegionEnvelope> {
        match CacheKey::children_of(parent.clone()) {
            Ok(key) => self.get_or_fetch(&key, label).await,
            Err(e) => {
                tracing::error!("   [FAIL] {}: {}", label, e);
                self.stats.failed += 1;
                None
            }
        }
    }

    /// Returns the listing for `key`, from disk when possible
    ///
    /// Without `force`, a stored listing is decoded and returned with no
    /// network activity. Otherwise the origin is asked and the raw body is
    /// written verbatim before the decoded listing is returned. A listing
    /// that cannot be obtained yields `None`; the caller moves on to siblings.
    async fn get_or_fetch(&mut self, key: &CacheKey, label: &str) -> Option<RegionEnvelope> {
        if !self.force && self.store.exists(key).await {
            match self.store.read_envelope(key).await {
                Ok(envelope) => {
                    tracing::info!("   [SKIP] {} - File exists locally.", label);
                    self.stats.skipped += 1;
                    return Some(envelope);
                }
                Err(e) => {
                    tracing::warn!("   Stored file for {} is unusable: {}", label, e);
                }
            }
        }

        tracing::info!("   [DOWN] Fetching {}...", label);

        let url = match join_endpoint(&self.origin, &key.endpoint()) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("   [FAIL] Failed to fetch {}: {}", label, e);
                self.stats.failed += 1;
                return None;
            }
        };

        let response = match self.fetcher.fetch(&url, self.timeout, &self.policy).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("   [FAIL] Failed to fetch {}: {}", label, e);
                self.stats.failed += 1;
                return None;
            }
        };

        let envelope = match response.envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("   [FAIL] Failed to fetch {}: malformed payload: {}", label, e);
                self.stats.failed += 1;
                return None;
            }
        };

        if let Err(e) = envelope.validate_children(key.collection(), key.parent()) {
            tracing::error!("   [FAIL] Failed to fetch {}: {}", label, e);
            self.stats.failed += 1;
            return None;
        }

        match self.store.write(key, &response.body).await {
            Ok(path) => {
                tracing::debug!("Saved {} to {}", key, path.display());
                self.stats.downloaded += 1;
            }
            Err(e) => {
                tracing::error!("   [FAIL] Could not save {}: {}", label, e);
                self.stats.failed += 1;
            }
        }

        Some(envelope)
    }

    fn outcome(&self, status: CrawlStatus) -> CrawlOutcome {
        CrawlOutcome {
            status,
            stats: self.stats,
        }
    }
}
