//! Region codes
//!
//! A code is a fixed-width digit string; its width alone tells the level.
//! Codes are taken exactly as given, so `" 32"` is not a province code.

use crate::region::RegionType;
use crate::RegionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated administrative region code
///
/// Codes are ASCII digits whose width identifies the level
/// (province=2, regency=4, district=7, village=10). A code's parent is
/// obtained by truncating it to the parent level's width.
///
/// # Examples
///
/// ```
/// use wilayah::region::{RegionCode, RegionType};
///
/// let code: RegionCode = "3201010".parse().unwrap();
/// assert_eq!(code.region_type(), RegionType::District);
/// assert_eq!(code.parent().unwrap().as_str(), "3201");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionCode {
    code: String,
    region_type: RegionType,
}

impl RegionCode {
    /// Parses a code of any level
    ///
    /// # Arguments
    ///
    /// * `code` - The raw code string
    ///
    /// # Returns
    ///
    /// * `Ok(RegionCode)` - The code is all digits and has a known width
    /// * `Err(RegionError::InvalidCode)` - Otherwise, including surrounding whitespace
    pub fn parse(code: &str) -> Result<Self, RegionError> {
        if code.is_empty() || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RegionError::InvalidCode(code.to_string()));
        }

        let region_type = RegionType::from_code_width(code.len())
            .ok_or_else(|| RegionError::InvalidCode(code.to_string()))?;

        Ok(Self {
            code: code.to_string(),
            region_type,
        })
    }

    /// Parses a code and checks that it belongs to the `expected` level
    pub fn parse_as(code: &str, expected: RegionType) -> Result<Self, RegionError> {
        let parsed = Self::parse(code).map_err(|_| RegionError::UnexpectedWidth {
            code: code.to_string(),
            expected: expected.label(),
        })?;

        if parsed.region_type != expected {
            return Err(RegionError::UnexpectedWidth {
                code: code.to_string(),
                expected: expected.label(),
            });
        }

        Ok(parsed)
    }

    /// Returns the level this code identifies
    pub fn region_type(&self) -> RegionType {
        self.region_type
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Derives the parent code by truncation; provinces have no parent
    pub fn parent(&self) -> Option<RegionCode> {
        let parent_type = self.region_type.parent()?;
        Some(Self {
            code: self.code[..parent_type.code_width()].to_string(),
            region_type: parent_type,
        })
    }

    /// Returns true if `self` sits directly below `parent`
    pub fn is_child_of(&self, parent: &RegionCode) -> bool {
        self.region_type.parent() == Some(parent.region_type) && self.code.starts_with(&parent.code)
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl FromStr for RegionCode {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegionCode {
    type Error = RegionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegionCode> for String {
    fn from(value: RegionCode) -> Self {
        value.code
    }
}
