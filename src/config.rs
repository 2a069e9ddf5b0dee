//! # Configuration
//!
//! Connection configuration for the identity provider endpoint.
//!
//! Kubernetes access is configured ambiently (kubeconfig or in-cluster
//! environment) and never appears here; only the provider endpoint and its
//! TLS material are explicit.

use std::path::PathBuf;

/// Identity provider endpoint configuration
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Provider API address, either a full URL or a bare `host:port`
    pub address: String,
    /// PEM bundle with the CA that signed the provider's serving certificate
    pub ca_cert: Option<PathBuf>,
    /// PEM client certificate for mutual TLS
    pub tls_cert: Option<PathBuf>,
    /// PEM client key for mutual TLS
    pub tls_key: Option<PathBuf>,
}

impl ProviderConfig {
    /// Base URL for API requests.
    ///
    /// A bare `host:port` address is normalized to `https://host:port`;
    /// trailing slashes are trimmed so paths can be appended directly.
    #[must_use]
    pub fn base_url(&self) -> String {
        let address = self.address.trim_end_matches('/');
        if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("https://{address}")
        }
    }
}
