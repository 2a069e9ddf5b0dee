//! Identity Provider REST Client
//!
//! Native REST implementation of the provider's client-management API.
//!
//! This implementation:
//! - Speaks the JSON/HTTP mapping of the provider's client API
//! - Decodes the idempotency flags from response bodies, never from HTTP status
//! - Supports an optional private CA bundle and mutual TLS
//! - Works directly against HTTP mock servers in tests

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Certificate, Identity, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::identity::{
    ClientIdentity, CreateClientResponse, DeleteClientResponse, IdentityProvider, VersionInfo,
};

/// REST client for the identity provider's client-management API
#[derive(Debug, Clone)]
pub struct IdentityProviderREST {
    http_client: reqwest::Client,
    base_url: String,
}

// ============================================================================
// Wire Structures
// ============================================================================
// Request payloads for the provider API. Responses deserialize directly into
// the public types in `crate::identity`, whose fields default when a
// provider omits them.
// ============================================================================

/// Request body for registering a client
#[derive(Debug, Serialize)]
struct CreateClientRequest<'a> {
    /// The client definition to register
    client: &'a ClientIdentity,
}

/// Error envelope returned by the provider on non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// Error details inside the provider's error envelope
#[derive(Debug, Deserialize)]
struct ApiError {
    /// Provider-reported error code
    #[serde(default)]
    code: u16,
    /// Human-readable error message
    message: String,
}

impl IdentityProviderREST {
    /// Create a client from endpoint configuration, loading any TLS material
    /// referenced by it.
    ///
    /// # Errors
    /// Returns an error when TLS material cannot be read or parsed, or when
    /// only one half of a client certificate/key pair is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().use_rustls_tls();

        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path)
                .with_context(|| format!("failed to read CA bundle {}", path.display()))?;
            let certificates = Certificate::from_pem_bundle(&pem)
                .with_context(|| format!("CA bundle {} is not valid PEM", path.display()))?;
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }

        match (&config.tls_cert, &config.tls_key) {
            (Some(cert_path), Some(key_path)) => {
                let mut pem = std::fs::read(cert_path).with_context(|| {
                    format!("failed to read client certificate {}", cert_path.display())
                })?;
                pem.extend(
                    std::fs::read(key_path).with_context(|| {
                        format!("failed to read client key {}", key_path.display())
                    })?,
                );
                let identity = Identity::from_pem(&pem)
                    .context("client certificate/key pair is not valid PEM")?;
                builder = builder.identity(identity);
            }
            (None, None) => {}
            _ => return Err(anyhow!("--tls-cert and --tls-key must be provided together")),
        }

        let http_client = builder.build().context("failed to create HTTP client")?;
        Ok(Self {
            http_client,
            base_url: config.base_url(),
        })
    }

    /// Create a client over a preconfigured transport.
    ///
    /// Used by tests to point at a mock server; the base URL is taken as-is.
    #[must_use]
    pub fn with_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Decode a response body, mapping non-2xx statuses to errors via the
    /// provider's error envelope when one is present.
    async fn decode<T>(&self, response: reqwest::Response, what: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                api_error(status, &body).context(format!("identity provider rejected {what}"))
            );
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode {what} response"))
    }
}

/// Build an error from a non-2xx provider response
fn api_error(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorResponse>(body) {
        anyhow!(
            "identity provider error: {} (code {})",
            envelope.error.message,
            envelope.error.code
        )
    } else {
        anyhow!("HTTP {status}: {body}")
    }
}

#[async_trait]
impl IdentityProvider for IdentityProviderREST {
    async fn get_version(&self) -> Result<VersionInfo> {
        let response = self
            .http_client
            .get(self.endpoint("/api/v1/version"))
            .send()
            .await
            .context("identity provider is unreachable")?;

        self.decode(response, "version request").await
    }

    async fn create_client(&self, client: &ClientIdentity) -> Result<CreateClientResponse> {
        debug!("registering OAuth2Client '{}'", client.id);

        let response = self
            .http_client
            .post(self.endpoint("/api/v1/clients"))
            .json(&CreateClientRequest { client })
            .send()
            .await
            .context("identity provider is unreachable")?;

        self.decode(response, "client registration").await
    }

    async fn delete_client(&self, id: &str) -> Result<DeleteClientResponse> {
        debug!("unregistering OAuth2Client '{id}'");

        let response = self
            .http_client
            .delete(self.endpoint(&format!("/api/v1/clients/{id}")))
            .send()
            .await
            .context("identity provider is unreachable")?;

        self.decode(response, "client deletion").await
    }
}
