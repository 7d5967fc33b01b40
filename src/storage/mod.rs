//! Storage module for the durable region cache
//!
//! This module handles all disk operations for region payloads:
//! - Mapping cache keys to file names and origin endpoints
//! - Existence checks used by the crawler's resume-by-skip logic
//! - Whole-file writes and reads of JSON payloads
//! - Inventory for statistics

mod fs;
mod key;

pub use fs::{FsStore, StoredEntry, STORE_DIR};
pub use key::{CacheKey, MEMORY_NAMESPACE};
