//! # Client Registrar
//!
//! Create/delete orchestration for OAuth2 client identities against the
//! identity provider, normalizing its idempotent response flags into
//! outcome enums. Already-exists and not-found are normal outcomes here;
//! only transport or provider failures become errors.

use crate::error::Result;
use crate::identity::{ClientIdentity, IdentityProvider};

/// Outcome of registering a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The provider registered a new client
    Created,
    /// A client with the requested id was already registered
    AlreadyExists,
}

/// Outcome of unregistering a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnregisterOutcome {
    /// The provider removed the client
    Deleted,
    /// The provider had no client with the requested id
    NotFound,
}

/// A registered client together with how the registration concluded
#[derive(Debug, Clone)]
pub struct Registration {
    /// The client as returned by the provider, id always populated
    pub identity: ClientIdentity,
    /// How the provider handled this registration
    pub outcome: RegisterOutcome,
}

/// Registers and unregisters OAuth2 clients
pub struct ClientRegistrar<'a> {
    provider: &'a dyn IdentityProvider,
}

impl std::fmt::Debug for ClientRegistrar<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistrar").finish_non_exhaustive()
    }
}

impl<'a> ClientRegistrar<'a> {
    /// Create a registrar over the given provider
    #[must_use]
    pub fn new(provider: &'a dyn IdentityProvider) -> Self {
        Self { provider }
    }

    /// Register a client with the provider.
    ///
    /// When the provider reports the client already exists, its response may
    /// omit the client entirely; the returned identity's id is then forced
    /// back to the requested id so callers can resolve the stored record.
    ///
    /// # Errors
    /// Propagates transport and provider failures unchanged.
    pub async fn create(&self, requested: &ClientIdentity) -> Result<Registration> {
        let response = self.provider.create_client(requested).await?;

        if response.already_exists {
            let mut identity = response.client.unwrap_or_default();
            identity.id = requested.id.clone();
            return Ok(Registration {
                identity,
                outcome: RegisterOutcome::AlreadyExists,
            });
        }

        Ok(Registration {
            identity: response.client.unwrap_or_else(|| requested.clone()),
            outcome: RegisterOutcome::Created,
        })
    }

    /// Unregister a client by id.
    ///
    /// # Errors
    /// Propagates transport and provider failures unchanged.
    pub async fn delete(&self, id: &str) -> Result<UnregisterOutcome> {
        let response = self.provider.delete_client(id).await?;

        if response.not_found {
            return Ok(UnregisterOutcome::NotFound);
        }
        Ok(UnregisterOutcome::Deleted)
    }
}
