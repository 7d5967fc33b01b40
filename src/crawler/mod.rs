//! Crawler module for bulk mirroring of the region tree
//!
//! This module contains the crawl logic, including:
//! - Crawl plans built from command-line flags
//! - The sequential, resumable tree walk
//! - Certificate bootstrap and origin client setup for a run

mod coordinator;
mod plan;

pub use coordinator::{CrawlOutcome, CrawlStats, CrawlStatus, Crawler};
pub use plan::{CrawlPlan, CrawlTarget};

use crate::config::Config;
use crate::fetch::{build_origin_client, CertificateBootstrapper, Fetcher, RetryPolicy};
use crate::storage::FsStore;
use crate::url::parse_base_url;
use crate::WilayahError;

/// Runs a complete crawl operation
///
/// This is the main entry point for the `fetch` command. It will:
/// 1. Ensure a CA bundle is available (degrading TLS verification on failure)
/// 2. Build the origin HTTP client from the bundle
/// 3. Walk the requested subtrees into the durable store
///
/// # Arguments
///
/// * `config` - The application configuration
/// * `plan` - What to crawl
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The crawl ran; check `exit_code()` for the status
/// * `Err(WilayahError)` - The crawl could not be set up
///
/// # Example
///
/// ```no_run
/// use wilayah::config::Config;
/// use wilayah::crawler::{run_crawl, CrawlPlan};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let plan = CrawlPlan::from_flags(false, None, None, Some("3201010"), false)?;
/// let outcome = run_crawl(&Config::default(), &plan).await?;
/// std::process::exit(outcome.exit_code());
/// # }
/// ```
pub async fn run_crawl(config: &Config, plan: &CrawlPlan) -> Result<CrawlOutcome, WilayahError> {
    let origin = parse_base_url(&config.origin.base_url)?;

    let bundle = CertificateBootstrapper::from_config(config)?
        .ensure_certificates()
        .await;
    let client =
        build_origin_client(&config.user_agent, &bundle, config.tls.insecure_fallback).await?;

    let mut crawler = Crawler::new(
        Fetcher::new(client),
        FsStore::new(&config.storage.public_root),
        origin,
        config.origin.timeout(),
        RetryPolicy::new(config.origin.max_retries, config.origin.initial_backoff()),
    );

    Ok(crawler.run(plan).await)
}
