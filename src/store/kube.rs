//! Kubernetes-backed cluster store
//!
//! [`ClusterStore`] implementation over kube-rs. Secrets are handled with
//! the typed core/v1 API; the provider's OAuth2Client records are a foreign
//! custom resource and are listed dynamically, so this crate carries no
//! schema for them beyond the group/version/kind constants.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, ApiResource, DeleteParams, ListParams, Patch, PatchParams, PostParams};
use kube::core::{DynamicObject, GroupVersionKind};
use kube::Client;
use serde_json::Value;

use crate::constants::{
    OAUTH2_CLIENT_GROUP, OAUTH2_CLIENT_KIND, OAUTH2_CLIENT_PLURAL, OAUTH2_CLIENT_VERSION,
};
use crate::store::ClusterStore;

/// Cluster store backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeClusterStore {
    client: Client,
}

// `kube::Client` is not `Debug`, so the derive does not apply here.
impl std::fmt::Debug for KubeClusterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterStore").finish_non_exhaustive()
    }
}

impl KubeClusterStore {
    /// Wrap an ambient-configured Kubernetes client
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn secrets(&self, namespace: &str) -> Api<Secret> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn client_records(&self, namespace: &str) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(
            OAUTH2_CLIENT_GROUP,
            OAUTH2_CLIENT_VERSION,
            OAUTH2_CLIENT_KIND,
        );
        let resource = ApiResource::from_gvk_with_plural(&gvk, OAUTH2_CLIENT_PLURAL);
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }
}

#[async_trait]
impl ClusterStore for KubeClusterStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        match self.secrets(namespace).get(name).await {
            Ok(secret) => Ok(Some(secret)),
            Err(kube::Error::Api(api_err)) if api_err.code == 404 => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to get secret {namespace}/{name}")),
        }
    }

    async fn create_secret(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<Option<Secret>> {
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..ObjectMeta::default()
            },
            string_data: (!data.is_empty()).then_some(data),
            ..Secret::default()
        };

        let created = self
            .secrets(namespace)
            .create(&PostParams::default(), &secret)
            .await
            .with_context(|| format!("failed to create secret {namespace}/{name}"))?;

        Ok(Some(created))
    }

    async fn merge_patch_secret(
        &self,
        namespace: &str,
        name: &str,
        patch: Value,
    ) -> Result<Secret> {
        self.secrets(namespace)
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .with_context(|| format!("failed to patch secret {namespace}/{name}"))
    }

    async fn json_patch_secret(
        &self,
        namespace: &str,
        name: &str,
        patch: json_patch::Patch,
    ) -> Result<Secret> {
        self.secrets(namespace)
            .patch(name, &PatchParams::default(), &Patch::Json::<()>(patch))
            .await
            .with_context(|| format!("failed to patch secret {namespace}/{name}"))
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        self.secrets(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .with_context(|| format!("failed to delete secret {namespace}/{name}"))
    }

    async fn list_client_records(&self, namespace: &str) -> Result<Vec<Value>> {
        let records = self
            .client_records(namespace)
            .list(&ListParams::default())
            .await
            .with_context(|| {
                format!("failed to list {OAUTH2_CLIENT_PLURAL} in namespace {namespace}")
            })?;

        records
            .items
            .into_iter()
            .map(|record| {
                serde_json::to_value(record).context("failed to serialize OAuth2Client record")
            })
            .collect()
    }

    fn current_namespace(&self) -> String {
        self.client.default_namespace().to_string()
    }
}
