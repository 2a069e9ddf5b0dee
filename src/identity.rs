//! # Client Identity
//!
//! The OAuth2 client type shared with the identity provider's
//! client-management API, the typed responses that API returns, and the
//! [`IdentityProvider`] trait the workflows depend on.
//!
//! The provider's API is idempotency-aware: creating a client that already
//! exists and deleting one that does not are reported through the
//! `already_exists` / `not_found` response flags, never as errors.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub mod rest;

/// An OAuth2 client as the identity provider understands it.
///
/// `id` is the logical identity. `secret` is generated server-side when the
/// definition leaves it empty, and is only knowable by resolving the
/// provider's stored record afterwards. Unknown fields are ignored on
/// deserialization, so stored records with extra provider-internal fields
/// project cleanly into this type.
///
/// Memory is zeroized on drop and `Debug` omits the secret, so identities
/// can be logged and discarded without leaking credentials.
// Field-level serde defaults: the container-level form would deserialize
// through a moved-out `Self::default()`, which the zeroizing Drop forbids.
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ClientIdentity {
    /// Logical client id, chosen by the caller
    #[serde(default)]
    pub id: String,
    /// Client secret, authoritative at the provider
    #[serde(default)]
    pub secret: String,
    /// Allowed redirect URIs
    #[serde(default)]
    pub redirect_uris: Vec<String>,
    /// Client ids allowed to mint tokens on this client's behalf
    #[serde(default)]
    pub trusted_peers: Vec<String>,
    /// Whether this is a public client (no secret required at token exchange)
    #[serde(default)]
    pub public: bool,
    /// Human-readable display name
    #[serde(default)]
    pub name: String,
    /// URL of a logo shown on consent screens
    #[serde(default)]
    pub logo_url: String,
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("id", &self.id)
            .field("public", &self.public)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Identity provider version information, reported by `GetVersion`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersionInfo {
    /// Server release the provider is running
    pub server: String,
    /// API revision the provider speaks
    pub api: i32,
}

/// Provider response to a client registration attempt
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateClientResponse {
    /// The stored client; providers may omit it when `already_exists` is set
    pub client: Option<ClientIdentity>,
    /// True when a client with the requested id was already registered
    pub already_exists: bool,
}

/// Provider response to a client deletion attempt
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct DeleteClientResponse {
    /// True when no client with the requested id was registered
    pub not_found: bool,
}

/// Client-management operations of the identity provider.
///
/// One implementation speaks the provider's REST API
/// ([`rest::IdentityProviderREST`]); tests substitute scripted fakes.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Report the provider's version. Used as a connectivity precheck
    /// before any mutating workflow runs.
    ///
    /// # Errors
    /// Returns an error when the provider cannot be reached.
    async fn get_version(&self) -> Result<VersionInfo>;

    /// Register a client. Registration of an id that already exists is not
    /// an error; it is reported through the response flag.
    ///
    /// # Errors
    /// Returns an error for transport, auth, or malformed-request failures.
    async fn create_client(&self, client: &ClientIdentity) -> Result<CreateClientResponse>;

    /// Unregister a client by id. Deleting an unknown id is not an error;
    /// it is reported through the response flag.
    ///
    /// # Errors
    /// Returns an error for transport, auth, or malformed-request failures.
    async fn delete_client(&self, id: &str) -> Result<DeleteClientResponse>;
}
