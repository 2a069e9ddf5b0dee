//! # Secret Reconciler
//!
//! Projects OAuth2 client credentials into a Kubernetes `Secret` and strips
//! them out again without touching keys owned by other writers.
//!
//! The reconciler:
//! - Creates the target secret when it does not exist yet
//! - Merges the managed credential keys into existing secrets
//! - Removes only the managed keys when foreign keys share the secret
//! - Deletes the whole secret when nothing else lives in it
//!
//! ## Upsert Flow
//!
//! 1. Skip when no secret name was requested
//! 2. Fetch the current secret
//! 3. Create an empty secret if it is missing
//! 4. Merge-patch the managed keys with the credential values
//!
//! ## Strip Flow
//!
//! 1. Skip when no secret name was requested
//! 2. Fetch the current secret; absent means nothing to do
//! 3. Foreign keys present: remove only the managed keys
//! 4. Otherwise: delete the secret object

use crate::constants::{DEFAULT_CLIENT_ID_KEY, DEFAULT_CLIENT_SECRET_KEY};
use crate::error::Result;
use crate::identity::ClientIdentity;
use crate::store::{ClusterStore, ObjectRef};
use json_patch::{PatchOperation, RemoveOperation};
use jsonptr::PointerBuf;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Secret keys the reconciler owns.
///
/// Everything else found in a secret is treated as foreign data and is never
/// written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedKeys {
    /// Key holding the OAuth2 client id.
    pub id_key: String,
    /// Key holding the OAuth2 client secret.
    pub secret_key: String,
}

impl Default for ManagedKeys {
    fn default() -> Self {
        Self {
            id_key: DEFAULT_CLIENT_ID_KEY.to_string(),
            secret_key: DEFAULT_CLIENT_SECRET_KEY.to_string(),
        }
    }
}

/// Result of an upsert pass over the target secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No secret name was requested, nothing to reconcile.
    Skipped,
    /// The secret was missing and the cluster store would not create it.
    Failed {
        /// Human-readable description of what went wrong.
        reason: String,
    },
    /// The managed keys now carry the credential values.
    Updated,
}

/// Result of a strip pass over the target secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripOutcome {
    /// No secret name was requested, nothing to reconcile.
    Skipped,
    /// The secret does not exist, nothing to remove.
    AlreadyAbsent,
    /// Foreign keys were present, only the managed keys were removed.
    KeysRemoved,
    /// The secret held nothing but managed keys and was deleted.
    SecretDeleted,
}

/// Reconciles one OAuth2 client's credentials against one secret.
pub struct SecretReconciler<'a> {
    store: &'a dyn ClusterStore,
    keys: ManagedKeys,
}

impl std::fmt::Debug for SecretReconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretReconciler")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl<'a> SecretReconciler<'a> {
    /// Creates a reconciler over `store` managing the given secret keys.
    #[must_use]
    pub fn new(store: &'a dyn ClusterStore, keys: ManagedKeys) -> Self {
        Self { store, keys }
    }

    fn namespace_for(&self, target: &ObjectRef) -> String {
        target
            .namespace
            .clone()
            .unwrap_or_else(|| self.store.current_namespace())
    }

    /// Writes the identity's credentials into the target secret, creating the
    /// secret first when it does not exist.
    ///
    /// Running this twice with the same identity converges on the same secret
    /// content. A store that refuses to create the missing secret yields
    /// [`UpsertOutcome::Failed`] rather than an error so the caller can decide
    /// how loud a partially reconciled state should be.
    ///
    /// # Errors
    ///
    /// Returns an error when the cluster store cannot be queried or patched.
    pub async fn upsert(
        &self,
        target: &ObjectRef,
        identity: &ClientIdentity,
    ) -> Result<UpsertOutcome> {
        let name = match target.name.as_deref() {
            Some(name) => name,
            None => {
                info!("no secret requested, skipping secret update");
                return Ok(UpsertOutcome::Skipped);
            }
        };
        let namespace = self.namespace_for(target);

        if self.store.get_secret(&namespace, name).await?.is_none() {
            info!("secret {}/{} does not exist, creating it", namespace, name);
            let created = self
                .store
                .create_secret(&namespace, name, BTreeMap::new())
                .await?;
            if created.is_none() {
                error!(
                    "failed to create secret {}/{}; occtl cannot resolve this, please investigate cluster state manually",
                    namespace, name
                );
                return Ok(UpsertOutcome::Failed {
                    reason: format!("cluster store refused to create secret {namespace}/{name}"),
                });
            }
            info!("secret {}/{} created", namespace, name);
        }

        let id_key = self.keys.id_key.as_str();
        let secret_key = self.keys.secret_key.as_str();
        let patch = json!({
            "stringData": {
                id_key: identity.id.clone(),
                secret_key: identity.secret.clone(),
            }
        });
        self.store.merge_patch_secret(&namespace, name, patch).await?;
        info!(
            "secret {}/{} updated with OAuth2 client id and client secret",
            namespace, name
        );
        Ok(UpsertOutcome::Updated)
    }

    /// Removes the managed keys from the target secret, deleting the secret
    /// outright when no foreign keys remain.
    ///
    /// The decision between patching and deleting is based on a read of the
    /// secret that is not compare-and-swapped against the mutation, so a
    /// concurrent writer can slip a key in between the two steps.
    ///
    /// # Errors
    ///
    /// Returns an error when the cluster store cannot be queried or mutated.
    pub async fn strip(&self, target: &ObjectRef) -> Result<StripOutcome> {
        let name = match target.name.as_deref() {
            Some(name) => name,
            None => {
                info!("no secret requested, skipping secret deletion");
                return Ok(StripOutcome::Skipped);
            }
        };
        let namespace = self.namespace_for(target);

        let secret = match self.store.get_secret(&namespace, name).await? {
            Some(secret) => secret,
            None => {
                info!("secret {}/{} does not exist, nothing to delete", namespace, name);
                return Ok(StripOutcome::AlreadyAbsent);
            }
        };

        let data = secret.data.unwrap_or_default();
        let managed = [self.keys.id_key.as_str(), self.keys.secret_key.as_str()];
        let has_foreign_keys = data.keys().any(|key| !managed.contains(&key.as_str()));

        if has_foreign_keys {
            info!(
                "secret {}/{} exists and has unknown keys, removing {} and {} only",
                namespace, name, self.keys.id_key, self.keys.secret_key
            );
            let operations = managed
                .into_iter()
                .filter(|key| data.contains_key(*key))
                .map(|key| {
                    PatchOperation::Remove(RemoveOperation {
                        path: PointerBuf::from_tokens(["data", key]),
                    })
                })
                .collect();
            self.store
                .json_patch_secret(&namespace, name, json_patch::Patch(operations))
                .await?;
            info!(
                "secret {}/{}: removed {} and {}, if they existed",
                namespace, name, self.keys.id_key, self.keys.secret_key
            );
            Ok(StripOutcome::KeysRemoved)
        } else {
            info!("secret {}/{} deleting", namespace, name);
            self.store.delete_secret(&namespace, name).await?;
            info!(
                "secret {}/{} removed along with keys {} and {}",
                namespace, name, self.keys.id_key, self.keys.secret_key
            );
            Ok(StripOutcome::SecretDeleted)
        }
    }
}
