//! Output module for reporting on the durable cache
//!
//! This module handles:
//! - Scanning the store for per-collection counts and sizes
//! - Printing a human-readable summary

pub mod stats;

pub use stats::{load_statistics, print_statistics, CacheStatistics};
