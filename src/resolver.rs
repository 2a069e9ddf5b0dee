//! # Identity Resolver
//!
//! Maps a logical client id to the provider's stored record for it.
//!
//! The store names client records by its own derived hash, so there is no
//! direct lookup from an id to a record. Resolution lists every record in
//! the namespace and linear-scans for an exact `id` match; cost is linear
//! in the number of records. The scan is isolated behind this type so an
//! indexed lookup could replace it without touching callers.
//!
//! Resolution is only meaningful while the provider still holds the record,
//! which in practice means immediately after a registration.

use anyhow::Context;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identity::ClientIdentity;
use crate::store::ClusterStore;

/// Resolves logical client ids to stored client records
pub struct IdentityResolver<'a> {
    store: &'a dyn ClusterStore,
}

impl std::fmt::Debug for IdentityResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

impl<'a> IdentityResolver<'a> {
    /// Create a resolver over the given store
    #[must_use]
    pub fn new(store: &'a dyn ClusterStore) -> Self {
        Self { store }
    }

    /// Resolve the stored client record whose `id` exactly equals `id`.
    ///
    /// When `namespace` is absent the ambient context namespace is used.
    /// Matching records are projected tolerantly: fields the identity
    /// schema does not know are dropped, not errors.
    ///
    /// # Errors
    /// Returns [`Error::ClientRecordNotFound`] when no record matches after
    /// a full scan; store failures propagate unchanged.
    pub async fn resolve(&self, id: &str, namespace: Option<&str>) -> Result<ClientIdentity> {
        let namespace =
            namespace.map_or_else(|| self.store.current_namespace(), ToString::to_string);

        let records = self.store.list_client_records(&namespace).await?;
        debug!(
            "scanning {} OAuth2Client records in namespace '{namespace}' for id '{id}'",
            records.len()
        );

        for record in records {
            if record.get("id").and_then(Value::as_str) == Some(id) {
                let identity: ClientIdentity = serde_json::from_value(record)
                    .with_context(|| {
                        format!("stored OAuth2Client record for '{id}' has an unusable shape")
                    })?;
                return Ok(identity);
            }
        }

        Err(Error::record_not_found(namespace, id))
    }
}
