//! # Cluster Store
//!
//! Access to namespaced cluster objects behind a trait, so the
//! reconciliation logic can run unchanged against the live cluster or
//! against in-memory fakes.
//!
//! Not-found is part of the contract, not an error: `get_secret` returns
//! `Ok(None)` when the object does not exist, and `create_secret` returns
//! `Ok(None)` when the store refuses the creation without a transport
//! failure. Everything else is an error.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use serde_json::Value;

pub mod kube;

/// Reference to a namespaced cluster object.
///
/// A missing namespace falls back to the ambient cluster context at call
/// time. A missing name on a Secret reference turns the whole
/// secret-management step into a deliberate no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRef {
    /// Namespace of the object, ambient context when absent
    pub namespace: Option<String>,
    /// Name of the object
    pub name: Option<String>,
}

/// Operations the reconciliation logic needs from the cluster
#[async_trait]
pub trait ClusterStore: Send + Sync {
    /// Fetch a Secret. `Ok(None)` when the store reports it does not exist.
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>>;

    /// Create a Secret with the given string data. `Ok(None)` when the
    /// store yields no usable object without raising a transport error.
    async fn create_secret(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<Option<Secret>>;

    /// Merge-patch a Secret and return the stored result.
    async fn merge_patch_secret(
        &self,
        namespace: &str,
        name: &str,
        patch: Value,
    ) -> Result<Secret>;

    /// Apply RFC 6902 operations to a Secret and return the stored result.
    async fn json_patch_secret(
        &self,
        namespace: &str,
        name: &str,
        patch: json_patch::Patch,
    ) -> Result<Secret>;

    /// Delete a Secret outright.
    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()>;

    /// List the provider's stored OAuth2Client records in a namespace as
    /// raw JSON objects. The record schema is provider-internal; callers
    /// project the fields they understand.
    async fn list_client_records(&self, namespace: &str) -> Result<Vec<Value>>;

    /// Namespace of the ambient cluster context
    fn current_namespace(&self) -> String;
}
