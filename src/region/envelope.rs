//! Origin payload envelopes
//!
//! The origin wraps every listing in `{"data": [...]}`. Decoding is strict at
//! the node level: a node must carry exactly `code` and `name`, and the code
//! must be a well-formed region code.

use crate::region::{RegionCode, RegionType};
use crate::RegionError;
use serde::{Deserialize, Serialize};

/// One administrative unit inside a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionNode {
    pub code: RegionCode,
    pub name: String,
}

impl RegionNode {
    /// Derived parent code (not part of the payload)
    pub fn parent_code(&self) -> Option<RegionCode> {
        self.code.parent()
    }
}

/// A `{"data": [RegionNode, ...]}` listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEnvelope {
    pub data: Vec<RegionNode>,

    /// Origin-provided metadata, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl RegionEnvelope {
    pub fn new(data: Vec<RegionNode>) -> Self {
        Self { data, meta: None }
    }

    /// Decodes an envelope from raw response or file bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Serializes the envelope as indented JSON
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Checks that every node is a `collection`-level code under `parent`
    ///
    /// # Arguments
    ///
    /// * `collection` - The level the listing is expected to contain
    /// * `parent` - The code the listing was requested for (`None` for provinces)
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every node has the right width and prefix
    /// * `Err(RegionError)` - The first offending node
    pub fn validate_children(
        &self,
        collection: RegionType,
        parent: Option<&RegionCode>,
    ) -> Result<(), RegionError> {
        for node in &self.data {
            if node.code.region_type() != collection {
                return Err(RegionError::UnexpectedWidth {
                    code: node.code.to_string(),
                    expected: collection.label(),
                });
            }

            if let Some(parent) = parent {
                if !node.code.is_child_of(parent) {
                    return Err(RegionError::PrefixMismatch {
                        code: node.code.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Returns the codes of all nodes in listing order
    pub fn codes(&self) -> impl Iterator<Item = &RegionCode> {
        self.data.iter().map(|node| &node.code)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
