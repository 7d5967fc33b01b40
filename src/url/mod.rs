//! URL handling module for Wilayah
//!
//! This module builds origin/mirror endpoint URLs and classifies mirror hosts
//! so that a mirror pointing back at the local machine is never consulted.

mod domain;

use crate::{UrlError, UrlResult};
use url::Url;

pub use domain::{extract_domain, is_loopback_host};

/// Parses a base URL, accepting only HTTP and HTTPS
///
/// # Examples
///
/// ```
/// use wilayah::url::parse_base_url;
///
/// assert!(parse_base_url("https://wilayah.id/api").is_ok());
/// assert!(parse_base_url("ftp://wilayah.id/api").is_err());
/// ```
pub fn parse_base_url(base: &str) -> UrlResult<Url> {
    let url = Url::parse(base.trim()).map_err(|e| UrlError::Parse(format!("{base}: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::Parse(format!("{base}: missing host")));
    }

    Ok(url)
}

/// Joins a base URL and a relative endpoint with exactly one slash between them
///
/// Any path already present on the base (e.g. `/api`) is kept.
///
/// # Arguments
///
/// * `base` - Base URL, with or without a trailing slash
/// * `endpoint` - Relative endpoint such as `regencies/32.json`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wilayah::url::join_endpoint;
///
/// let base = Url::parse("https://wilayah.id/api/").unwrap();
/// let url = join_endpoint(&base, "/provinces.json").unwrap();
/// assert_eq!(url.as_str(), "https://wilayah.id/api/provinces.json");
/// ```
pub fn join_endpoint(base: &Url, endpoint: &str) -> UrlResult<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| UrlError::Parse(format!("{joined}: {e}")))
}

/// Returns true if `url` points at this machine (`localhost` or a loopback IP)
pub fn is_local_url(url: &Url) -> bool {
    extract_domain(url)
        .map(|host| is_loopback_host(&host))
        .unwrap_or(false)
}
