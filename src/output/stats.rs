//! Statistics over the durable region cache
//!
//! This module provides functionality for summarizing what a crawl has
//! stored so far and the state of the CA bundle.

use crate::config::Config;
use crate::fetch::CertificateBundle;
use crate::region::RegionType;
use crate::storage::{CacheKey, FsStore};
use crate::WilayahError;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Cache statistics summary
#[derive(Debug, Clone)]
pub struct CacheStatistics {
    /// Directory holding the payload files
    pub store_dir: PathBuf,

    /// Number of stored listings per collection
    pub listings_by_collection: BTreeMap<RegionType, u64>,

    /// Bytes on disk per collection
    pub bytes_by_collection: BTreeMap<RegionType, u64>,

    /// Provinces named in the stored provinces list, if it is present and readable
    pub provinces_listed: Option<usize>,

    /// CA bundle location and presence
    pub ca_bundle: CertificateBundle,
}

impl CacheStatistics {
    pub fn total_listings(&self) -> u64 {
        self.listings_by_collection.values().sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.bytes_by_collection.values().sum()
    }

    /// Stored listings of `collection`
    pub fn listings(&self, collection: RegionType) -> u64 {
        self.listings_by_collection
            .get(&collection)
            .copied()
            .unwrap_or(0)
    }
}

/// Loads statistics from the store configured in `config`
///
/// # Returns
///
/// * `Ok(CacheStatistics)` - Successfully scanned the store
/// * `Err(WilayahError)` - The store directory could not be read
pub async fn load_statistics(config: &Config) -> Result<CacheStatistics, WilayahError> {
    let store = FsStore::new(&config.storage.public_root);

    let mut listings_by_collection = BTreeMap::new();
    let mut bytes_by_collection = BTreeMap::new();

    for entry in store.inventory().await? {
        let collection = entry.key.collection();
        *listings_by_collection.entry(collection).or_insert(0) += 1;
        *bytes_by_collection.entry(collection).or_insert(0) += entry.bytes;
    }

    let provinces_listed = match store.read_envelope(&CacheKey::provinces()).await {
        Ok(envelope) => Some(envelope.len()),
        Err(e) => {
            tracing::debug!("Provinces list unavailable: {}", e);
            None
        }
    };

    Ok(CacheStatistics {
        store_dir: store.dir(),
        listings_by_collection,
        bytes_by_collection,
        provinces_listed,
        ca_bundle: CertificateBundle::probe(config.storage.ca_bundle_path()),
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CacheStatistics) {
    println!("=== Wilayah Cache Statistics ===\n");

    println!("Store: {}", stats.store_dir.display());
    println!(
        "  Total listings: {} ({} bytes)",
        stats.total_listings(),
        stats.total_bytes()
    );
    println!();

    println!("Listings by Collection:");
    for collection in RegionType::ALL {
        println!(
            "  {}: {} ({} bytes)",
            collection.collection(),
            stats.listings(collection),
            stats.bytes_by_collection.get(&collection).unwrap_or(&0)
        );
    }
    println!();

    match stats.provinces_listed {
        Some(total) => {
            let covered = stats.listings(RegionType::Regency) as usize;
            let percentage = if total > 0 {
                (covered as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            println!(
                "Province Coverage: {:.1}% ({} / {} provinces have regency listings)",
                percentage, covered, total
            );
        }
        None => println!("Province Coverage: provinces list not stored yet"),
    }
    println!();

    let status = if stats.ca_bundle.valid {
        "present"
    } else {
        "missing"
    };
    println!("CA Bundle: {} ({})", stats.ca_bundle.path.display(), status);
}
