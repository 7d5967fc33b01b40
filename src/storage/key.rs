//! Cache keys
//!
//! One key per stored listing. The same key names the file on disk, the
//! endpoint on the origin and mirror, and the entry in the memory cache.

use crate::region::{RegionCode, RegionType};
use crate::RegionError;
use std::fmt;

/// Prefix of every in-memory cache key
pub const MEMORY_NAMESPACE: &str = "wilayah";

/// Identifies one stored listing: a collection, optionally scoped to a parent code
///
/// The only unscoped listing is the provinces list; every other listing holds
/// the children of one parent (`regencies` of a province, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    collection: RegionType,
    parent: Option<RegionCode>,
}

impl CacheKey {
    /// The top-level provinces list
    pub fn provinces() -> Self {
        Self {
            collection: RegionType::Province,
            parent: None,
        }
    }

    /// The listing of `parent`'s direct children
    ///
    /// # Errors
    ///
    /// Villages have no children; passing a village code is an error.
    pub fn children_of(parent: RegionCode) -> Result<Self, RegionError> {
        let collection = parent
            .region_type()
            .child()
            .ok_or_else(|| RegionError::InvalidCode(parent.to_string()))?;

        Ok(Self {
            collection,
            parent: Some(parent),
        })
    }

    /// Builds a key from a collection and an optional parent code
    ///
    /// The parent must be of the collection's parent level; the provinces
    /// collection takes no parent.
    pub fn new(collection: RegionType, parent: Option<RegionCode>) -> Result<Self, RegionError> {
        match (collection.parent(), parent) {
            (None, None) => Ok(Self::provinces()),
            (Some(expected), Some(code)) if code.region_type() == expected => Ok(Self {
                collection,
                parent: Some(code),
            }),
            (Some(expected), Some(code)) => Err(RegionError::UnexpectedWidth {
                code: code.to_string(),
                expected: expected.label(),
            }),
            (Some(expected), None) => Err(RegionError::UnexpectedWidth {
                code: String::new(),
                expected: expected.label(),
            }),
            (None, Some(code)) => Err(RegionError::InvalidCode(code.to_string())),
        }
    }

    /// Builds a key from a collection name and raw code, as received over HTTP
    pub fn parse(collection: &str, code: Option<&str>) -> Result<Self, RegionError> {
        let collection = RegionType::from_collection(collection)?;
        let parent = match (collection.parent(), code) {
            (Some(level), Some(code)) => Some(RegionCode::parse_as(code, level)?),
            (_, None) => None,
            (None, Some(code)) => return Err(RegionError::InvalidCode(code.to_string())),
        };
        Self::new(collection, parent)
    }

    /// Recovers a key from a stored file name (`regencies_32.json`)
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".json")?;
        match stem.split_once('_') {
            Some((collection, code)) => Self::parse(collection, Some(code)).ok(),
            None => Self::parse(stem, None).ok(),
        }
    }

    /// The level of the nodes in this listing
    pub fn collection(&self) -> RegionType {
        self.collection
    }

    pub fn parent(&self) -> Option<&RegionCode> {
        self.parent.as_ref()
    }

    /// File name inside the store directory
    pub fn file_name(&self) -> String {
        match &self.parent {
            Some(code) => format!("{}_{}.json", self.collection.collection(), code),
            None => format!("{}.json", self.collection.collection()),
        }
    }

    /// Endpoint path relative to the origin or mirror base URL
    pub fn endpoint(&self) -> String {
        match &self.parent {
            Some(code) => format!("{}/{}.json", self.collection.collection(), code),
            None => format!("{}.json", self.collection.collection()),
        }
    }

    /// Key used by the in-memory resolver cache
    pub fn memory_key(&self) -> String {
        match &self.parent {
            Some(code) => format!(
                "{}_{}_{}",
                MEMORY_NAMESPACE,
                self.collection.collection(),
                code
            ),
            None => format!("{}_{}", MEMORY_NAMESPACE, self.collection.collection()),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(code) => write!(f, "{} of {}", self.collection.collection(), code),
            None => f.write_str(self.collection.collection()),
        }
    }
}
