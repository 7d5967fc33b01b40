//! Resolver module for single lookups
//!
//! This module contains:
//! - The process-wide TTL memory cache and its clock
//! - The tiered resolver behind the query surface

mod memory;
mod tiered;

pub use memory::{Clock, ManualClock, MemoryCache, SystemClock};
pub use tiered::Resolver;
