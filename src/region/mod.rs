//! Region data model
//!
//! This module defines the administrative-geography types shared by the
//! crawler and the resolver.
//!
//! # Components
//!
//! - `RegionType`: The four levels of the tree (province, regency, district, village)
//! - `RegionCode`: A validated, fixed-width hierarchical code
//! - `RegionNode` / `RegionEnvelope`: The `{"data": [...]}` payloads served by the origin

mod code;
mod envelope;
mod region_type;

// Re-export main types
pub use code::RegionCode;
pub use envelope::{RegionEnvelope, RegionNode};
pub use region_type::RegionType;
