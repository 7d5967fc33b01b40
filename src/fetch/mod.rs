//! Fetch module for talking to the origin API and the CDN mirror
//!
//! This module contains:
//! - The retry policy (bounded attempts, exponential backoff)
//! - The retrying fetcher with client/transport error classification
//! - CA bundle bootstrap and origin client construction

mod certs;
mod fetcher;
mod retry;

pub use certs::{build_origin_client, CertificateBootstrapper, CertificateBundle};
pub use fetcher::{build_http_client, FetchResponse, Fetcher};
pub use retry::RetryPolicy;
