//! CA bundle bootstrap
//!
//! The origin is contacted with a CA bundle downloaded once into the private
//! storage root. When the bundle cannot be obtained, the configured policy
//! decides whether origin requests run without certificate verification.

use crate::config::{Config, UserAgentConfig};
use crate::fetch::fetcher::client_builder;
use crate::url::parse_base_url;
use crate::{FetchError, FetchResult, WilayahError};
use reqwest::{Certificate, Client};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// A CA bundle location and whether it can be used for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateBundle {
    pub path: PathBuf,

    /// `false` means origin requests proceed without the bundle
    pub valid: bool,
}

impl CertificateBundle {
    /// Re-derives validity purely from the presence of the bundle file
    pub fn probe(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let valid = path.is_file();
        Self { path, valid }
    }

    /// Reads and parses the bundle's certificates
    async fn load_certificates(&self) -> Option<Vec<Certificate>> {
        if !self.valid {
            return None;
        }

        let pem = match tokio::fs::read(&self.path).await {
            Ok(pem) => pem,
            Err(e) => {
                tracing::warn!("Failed to read CA bundle {}: {}", self.path.display(), e);
                return None;
            }
        };

        match Certificate::from_pem_bundle(&pem) {
            Ok(certs) if !certs.is_empty() => Some(certs),
            Ok(_) => {
                tracing::warn!("CA bundle {} contains no certificates", self.path.display());
                None
            }
            Err(e) => {
                tracing::warn!("CA bundle {} is not valid PEM: {}", self.path.display(), e);
                None
            }
        }
    }
}

/// Downloads the CA bundle once and reuses it afterwards
#[derive(Debug, Clone)]
pub struct CertificateBootstrapper {
    bundle_path: PathBuf,
    source_url: Url,
    timeout: Duration,
    insecure_fallback: bool,
    user_agent: UserAgentConfig,
}

impl CertificateBootstrapper {
    pub fn new(
        bundle_path: impl Into<PathBuf>,
        source_url: Url,
        timeout: Duration,
        insecure_fallback: bool,
        user_agent: UserAgentConfig,
    ) -> Self {
        Self {
            bundle_path: bundle_path.into(),
            source_url,
            timeout,
            insecure_fallback,
            user_agent,
        }
    }

    /// Creates a bootstrapper from the `[tls]` and `[storage]` sections
    pub fn from_config(config: &Config) -> Result<Self, WilayahError> {
        Ok(Self::new(
            config.storage.ca_bundle_path(),
            parse_base_url(&config.tls.ca_bundle_url)?,
            config.tls.timeout(),
            config.tls.insecure_fallback,
            config.user_agent.clone(),
        ))
    }

    pub fn bundle_path(&self) -> &Path {
        &self.bundle_path
    }

    /// Makes sure a CA bundle is available
    ///
    /// 1. An existing bundle file is returned as valid without network activity
    /// 2. Otherwise the bundle is downloaded with verification on
    /// 3. If that fails and the insecure policy is enabled, it is downloaded
    ///    again with verification off
    /// 4. If nothing worked the bundle is returned as not valid
    ///
    /// Never fails: certificate problems degrade TLS verification instead of
    /// aborting the caller.
    pub async fn ensure_certificates(&self) -> CertificateBundle {
        if self.bundle_path.is_file() {
            tracing::debug!("Using existing CA bundle {}", self.bundle_path.display());
            return CertificateBundle::probe(&self.bundle_path);
        }

        tracing::warn!("[WARNING] Downloading cacert.pem for SSL verification...");
        match self.download(false).await {
            Ok(()) => {
                tracing::info!("[SUCCESS] cacert.pem downloaded.");
                return CertificateBundle::probe(&self.bundle_path);
            }
            Err(e) => tracing::warn!("[WARNING] Failed to download cacert.pem: {}", e),
        }

        if self.insecure_fallback {
            tracing::warn!("[WARNING] Retrying cacert.pem download without TLS verification");
            match self.download(true).await {
                Ok(()) => {
                    tracing::warn!("[SUCCESS] cacert.pem downloaded (insecure fallback).");
                    return CertificateBundle::probe(&self.bundle_path);
                }
                Err(e) => tracing::warn!("[WARNING] Insecure cacert.pem download failed: {}", e),
            }
            tracing::error!("[ERROR] Could not download certs. Will proceed insecurely.");
        } else {
            tracing::error!(
                "[ERROR] Could not download certs and insecure fallback is disabled; using built-in roots."
            );
        }

        CertificateBundle {
            path: self.bundle_path.clone(),
            valid: false,
        }
    }

    /// Downloads the bundle and persists it if it parses as PEM
    async fn download(&self, insecure: bool) -> Result<(), WilayahError> {
        let client = client_builder(&self.user_agent)
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(FetchError::Build)?;

        let response = client
            .get(self.source_url.clone())
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        let certs = Certificate::from_pem_bundle(&body)?;
        if certs.is_empty() {
            return Err(WilayahError::Fetch(FetchError::Transport {
                url: self.source_url.to_string(),
                message: "CA bundle contains no certificates".to_string(),
            }));
        }

        if let Some(parent) = self.bundle_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.bundle_path.with_extension("pem.tmp");
        tokio::fs::write(&tmp, &body).await?;
        tokio::fs::rename(&tmp, &self.bundle_path).await?;

        Ok(())
    }
}

/// Builds the client used for origin requests
///
/// # Arguments
///
/// * `user_agent` - User agent settings
/// * `bundle` - The CA bundle state
/// * `insecure_fallback` - Whether to disable verification when the bundle is unusable
///
/// # Returns
///
/// * Bundle usable → its certificates are added as trust roots
/// * Bundle unusable, policy on → certificate verification disabled (logged)
/// * Bundle unusable, policy off → built-in roots only
pub async fn build_origin_client(
    user_agent: &UserAgentConfig,
    bundle: &CertificateBundle,
    insecure_fallback: bool,
) -> FetchResult<Client> {
    let mut builder = client_builder(user_agent);

    match bundle.load_certificates().await {
        Some(certs) => {
            tracing::debug!(
                "Trusting {} certificates from {}",
                certs.len(),
                bundle.path.display()
            );
            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }
        None if insecure_fallback => {
            tracing::warn!("No usable CA bundle; origin TLS certificates will NOT be verified");
            builder = builder.danger_accept_invalid_certs(true);
        }
        None => {
            tracing::info!("No usable CA bundle; using built-in TLS roots");
        }
    }

    builder.build().map_err(FetchError::Build)
}
