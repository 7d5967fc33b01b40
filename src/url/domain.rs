use std::net::IpAddr;
use url::Url;

/// Extracts the lowercase host from a URL
///
/// IPv6 hosts are returned without their surrounding brackets.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use wilayah::url::extract_domain;
///
/// let url = Url::parse("https://WILAYAH.ID/api").unwrap();
/// assert_eq!(extract_domain(&url), Some("wilayah.id".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_lowercase())
}

/// Returns true for `localhost`, `*.localhost` and loopback IP addresses
///
/// # Arguments
///
/// * `host` - A lowercase host name or IP literal
pub fn is_loopback_host(host: &str) -> bool {
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    host.parse::<IpAddr>()
        .map(|ip| ip.is_loopback() || ip.is_unspecified())
        .unwrap_or(false)
}
