//! # Workflows
//!
//! Top-level `create` and `delete` sequences composing the registrar, the
//! resolver, and the secret reconciler.
//!
//! Both workflows are strictly sequential. Every external call runs exactly
//! once; recognized idempotent signals (already exists, not found) are folded
//! into the summaries, everything else aborts the remaining steps.

use crate::error::{Error, Result};
use crate::identity::{ClientIdentity, IdentityProvider};
use crate::reconciler::{ManagedKeys, SecretReconciler, StripOutcome, UpsertOutcome};
use crate::registrar::{ClientRegistrar, RegisterOutcome, UnregisterOutcome};
use crate::resolver::IdentityResolver;
use crate::store::{ClusterStore, ObjectRef};
use anyhow::Context;
use tracing::{info, warn};

/// Where a workflow run reads and writes cluster state.
#[derive(Debug, Clone, Default)]
pub struct ReconcileTarget {
    /// Namespace holding the stored OAuth2 client records. Falls back to the
    /// ambient namespace of the cluster connection when unset.
    pub client_namespace: Option<String>,
    /// Secret receiving (or giving up) the managed credential keys.
    pub secret: ObjectRef,
    /// Secret keys carrying the credentials.
    pub keys: ManagedKeys,
}

/// What the `create` workflow did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSummary {
    /// Id of the registered client.
    pub client_id: String,
    /// Whether the provider created the client or already had it.
    pub registration: RegisterOutcome,
    /// How the secret upsert went.
    pub upsert: UpsertOutcome,
}

/// What the `delete` workflow did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteSummary {
    /// How the secret strip went.
    pub strip: StripOutcome,
    /// Whether the provider deleted the client or never had it.
    pub unregister: UnregisterOutcome,
}

impl DeleteSummary {
    /// True when the provider reported the client as missing.
    ///
    /// Secret cleanup does not influence this: only an unregistration that
    /// found nothing to delete marks the run as failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.unregister == UnregisterOutcome::NotFound
    }
}

/// Verifies the identity provider answers before any mutating workflow runs.
///
/// # Errors
///
/// Returns an error when the provider's version endpoint cannot be reached
/// or decoded, aborting the whole invocation.
pub async fn check_connection(provider: &dyn IdentityProvider, address: &str) -> Result<()> {
    let version = provider
        .get_version()
        .await
        .with_context(|| format!("could not reach identity provider at {address}"))?;
    info!(
        "connected to {}: server {} api {}",
        address, version.server, version.api
    );
    Ok(())
}

/// Registers the client with the identity provider and projects its live
/// credentials into the target secret.
///
/// Registration is idempotent: an `AlreadyExists` response proceeds exactly
/// like a fresh `Created`. The credentials written to the secret are the ones
/// resolved from the cluster records, not the ones from the request, so a
/// rerun converges on the secret value the provider actually serves.
///
/// # Errors
///
/// Returns [`Error::CredentialsUnrecoverable`] when the stored record cannot
/// be found even though registration succeeded, and propagates any transport
/// or cluster failure from the underlying steps.
pub async fn run_create(
    provider: &dyn IdentityProvider,
    store: &dyn ClusterStore,
    target: &ReconcileTarget,
    requested: &ClientIdentity,
) -> Result<CreateSummary> {
    let registrar = ClientRegistrar::new(provider);
    let registration = registrar.create(requested).await?;
    match registration.outcome {
        RegisterOutcome::Created => {
            info!("OAuth2Client {} created", registration.identity.id);
        }
        RegisterOutcome::AlreadyExists => {
            info!("OAuth2Client {} already exists", registration.identity.id);
        }
    }

    let resolver = IdentityResolver::new(store);
    let resolved = match resolver
        .resolve(&registration.identity.id, target.client_namespace.as_deref())
        .await
    {
        Ok(identity) => identity,
        Err(Error::ClientRecordNotFound { namespace, id }) => {
            return Err(Error::credentials_unrecoverable(namespace, id));
        }
        Err(other) => return Err(other),
    };

    let reconciler = SecretReconciler::new(store, target.keys.clone());
    let upsert = reconciler.upsert(&target.secret, &resolved).await?;

    // TODO: propagate a Failed upsert into the process exit status.
    Ok(CreateSummary {
        client_id: registration.identity.id.clone(),
        registration: registration.outcome,
        upsert,
    })
}

/// Strips the managed keys from the target secret, then unregisters the
/// client from the identity provider.
///
/// The strip runs first: key removal does not depend on the provider record,
/// and the secret's ownership is established while the client still logically
/// exists.
///
/// # Errors
///
/// Propagates any transport or cluster failure from the underlying steps. A
/// provider that never had the client is a [`DeleteSummary::is_failure`]
/// outcome, not an error.
pub async fn run_delete(
    provider: &dyn IdentityProvider,
    store: &dyn ClusterStore,
    target: &ReconcileTarget,
    client_id: &str,
) -> Result<DeleteSummary> {
    let reconciler = SecretReconciler::new(store, target.keys.clone());
    let strip = reconciler.strip(&target.secret).await?;

    let registrar = ClientRegistrar::new(provider);
    let unregister = registrar.delete(client_id).await?;
    if unregister == UnregisterOutcome::NotFound {
        warn!(
            "identity provider reported OAuth2Client {} did not exist",
            client_id
        );
    }

    Ok(DeleteSummary { strip, unregister })
}
