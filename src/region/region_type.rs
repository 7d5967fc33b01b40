/// Region type definitions for the administrative hierarchy
///
/// Each level has a fixed code width; a child's code extends its parent's code.
use crate::RegionError;
use std::fmt;
use std::str::FromStr;

/// One level of the province → regency → district → village tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionType {
    /// Provinsi, 2-digit code (e.g. `32`)
    Province,

    /// Kabupaten/Kota, 4-digit code (e.g. `3201`)
    Regency,

    /// Kecamatan, 7-digit code (e.g. `3201010`)
    District,

    /// Desa/Kelurahan, 10-digit code (e.g. `3201010001`)
    Village,
}

impl RegionType {
    /// All levels, root first
    pub const ALL: [RegionType; 4] = [
        Self::Province,
        Self::Regency,
        Self::District,
        Self::Village,
    ];

    /// Returns the fixed code width for this level
    pub fn code_width(&self) -> usize {
        match self {
            Self::Province => 2,
            Self::Regency => 4,
            Self::District => 7,
            Self::Village => 10,
        }
    }

    /// Returns the level whose codes have exactly `width` characters
    pub fn from_code_width(width: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code_width() == width)
    }

    /// Returns the plural collection name used in origin paths and file names
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Province => "provinces",
            Self::Regency => "regencies",
            Self::District => "districts",
            Self::Village => "villages",
        }
    }

    /// Parses a plural collection name (`"regencies"`, ...)
    pub fn from_collection(name: &str) -> Result<Self, RegionError> {
        Self::ALL
            .into_iter()
            .find(|t| t.collection() == name)
            .ok_or_else(|| RegionError::UnknownType(name.to_string()))
    }

    /// Returns the singular, human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::Regency => "regency",
            Self::District => "district",
            Self::Village => "village",
        }
    }

    /// Returns the level above this one, if any
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Province => None,
            Self::Regency => Some(Self::Province),
            Self::District => Some(Self::Regency),
            Self::Village => Some(Self::District),
        }
    }

    /// Returns the level below this one, if any
    pub fn child(&self) -> Option<Self> {
        match self {
            Self::Province => Some(Self::Regency),
            Self::Regency => Some(Self::District),
            Self::District => Some(Self::Village),
            Self::Village => None,
        }
    }
}

impl fmt::Display for RegionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RegionType {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "province" => Ok(Self::Province),
            "regency" => Ok(Self::Regency),
            "district" => Ok(Self::District),
            "village" => Ok(Self::Village),
            other => Self::from_collection(other),
        }
    }
}
