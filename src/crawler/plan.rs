//! Crawl plans built from command-line flags

use crate::region::{RegionCode, RegionType};
use crate::RegionError;

/// One subtree the crawler has been asked to walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlTarget {
    /// Villages of one district
    District(RegionCode),

    /// Districts of one regency, then villages of each district
    Regency(RegionCode),

    /// Regencies of one province, then everything below them
    Province(RegionCode),

    /// Every province in the origin's listing order
    All,
}

/// What a crawl run should fetch
///
/// The specific flags are independent: every one that is set is crawled, in
/// the order district, regency, province. `all` applies only when no
/// specific flag is set. With no flags at all, only the provinces list is
/// ensured and the run reports that there is nothing to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlPlan {
    pub all: bool,
    pub province: Option<RegionCode>,
    pub regency: Option<RegionCode>,
    pub district: Option<RegionCode>,

    /// Re-fetch and overwrite nodes that are already stored
    pub force: bool,
}

impl CrawlPlan {
    /// Builds a plan from raw flag values, validating each code's level
    ///
    /// # Arguments
    ///
    /// * `all` - The `--all` flag
    /// * `province` / `regency` / `district` - Raw codes from the CLI
    /// * `force` - The `--force` flag
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlPlan)` - All given codes have the expected width
    /// * `Err(RegionError)` - A code is malformed or belongs to another level
    pub fn from_flags(
        all: bool,
        province: Option<&str>,
        regency: Option<&str>,
        district: Option<&str>,
        force: bool,
    ) -> Result<Self, RegionError> {
        Ok(Self {
            all,
            province: province
                .map(|c| RegionCode::parse_as(c, RegionType::Province))
                .transpose()?,
            regency: regency
                .map(|c| RegionCode::parse_as(c, RegionType::Regency))
                .transpose()?,
            district: district
                .map(|c| RegionCode::parse_as(c, RegionType::District))
                .transpose()?,
            force,
        })
    }

    /// Returns the targets to crawl, in execution order
    pub fn targets(&self) -> Vec<CrawlTarget> {
        let mut targets = Vec::new();

        if let Some(code) = &self.district {
            targets.push(CrawlTarget::District(code.clone()));
        }
        if let Some(code) = &self.regency {
            targets.push(CrawlTarget::Regency(code.clone()));
        }
        if let Some(code) = &self.province {
            targets.push(CrawlTarget::Province(code.clone()));
        }

        if targets.is_empty() && self.all {
            targets.push(CrawlTarget::All);
        }

        targets
    }

    /// Returns true if the plan asks for nothing beyond the provinces list
    pub fn is_empty(&self) -> bool {
        self.targets().is_empty()
    }
}
