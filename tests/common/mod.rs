//! Shared in-memory fakes for workflow-level tests.
//!
//! `FakeClusterStore` emulates the secret semantics the live cluster
//! provides: merge patches fold `stringData` into the base64 `data` map the
//! way the API server does, and JSON patches apply RFC 6902 operations
//! against the serialized object. `FakeIdentityProvider` can share the
//! stored records vector with the store, so a registration immediately
//! becomes resolvable, like a provider whose storage backend is the cluster
//! itself.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use oauth_client_ctl::identity::{
    ClientIdentity, CreateClientResponse, DeleteClientResponse, IdentityProvider, VersionInfo,
};
use oauth_client_ctl::store::ClusterStore;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the Kubernetes-backed store.
pub struct FakeClusterStore {
    secrets: Mutex<HashMap<(String, String), Secret>>,
    records: Arc<Mutex<Vec<Value>>>,
    journal: Arc<Mutex<Vec<String>>>,
    /// Namespace whose record listing yields the shared records.
    pub records_namespace: String,
    /// Namespace reported by `current_namespace`.
    pub ambient_namespace: String,
    /// When set, `create_secret` reports no usable object.
    pub refuse_creation: bool,
    /// When set, `get_secret` fails outright.
    pub fail_gets: bool,
}

impl FakeClusterStore {
    pub fn new() -> Self {
        Self {
            secrets: Mutex::new(HashMap::new()),
            records: Arc::new(Mutex::new(Vec::new())),
            journal: Arc::new(Mutex::new(Vec::new())),
            records_namespace: "auth".to_string(),
            ambient_namespace: "default".to_string(),
            refuse_creation: false,
            fail_gets: false,
        }
    }

    /// Seeds a secret with the given string entries.
    #[allow(dead_code)] // Not every test binary seeds secrets
    pub fn with_secret(self, namespace: &str, name: &str, entries: &[(&str, &str)]) -> Self {
        let data: BTreeMap<String, ByteString> = entries
            .iter()
            .map(|(key, value)| ((*key).to_string(), ByteString(value.as_bytes().to_vec())))
            .collect();
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        };
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), secret);
        self
    }

    /// Seeds a stored client record.
    #[allow(dead_code)] // Not every test binary seeds records
    pub fn with_record(self, record: Value) -> Self {
        self.records.lock().unwrap().push(record);
        self
    }

    /// Current string data of a secret, or `None` when it does not exist.
    #[allow(dead_code)] // Not every test binary inspects secret data
    pub fn secret_data(&self, namespace: &str, name: &str) -> Option<BTreeMap<String, String>> {
        self.secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .map(|secret| {
                secret
                    .data
                    .clone()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(key, ByteString(bytes))| {
                        (key, String::from_utf8(bytes).unwrap_or_default())
                    })
                    .collect()
            })
    }

    #[allow(dead_code)] // Not every test binary checks secret existence
    pub fn has_secret(&self, namespace: &str, name: &str) -> bool {
        self.secrets
            .lock()
            .unwrap()
            .contains_key(&(namespace.to_string(), name.to_string()))
    }

    /// Ids of the stored client records.
    #[allow(dead_code)] // Not every test binary inspects records
    pub fn record_ids(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect()
    }

    /// Every store and provider operation performed so far, in order.
    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }

    fn log(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

impl Default for FakeClusterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClusterStore for FakeClusterStore {
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Option<Secret>> {
        self.log(format!("get_secret {namespace}/{name}"));
        if self.fail_gets {
            bail!("injected failure getting secret {namespace}/{name}");
        }
        Ok(self
            .secrets
            .lock()
            .unwrap()
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_secret(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> Result<Option<Secret>> {
        self.log(format!("create_secret {namespace}/{name}"));
        if self.refuse_creation {
            return Ok(None);
        }
        let folded: BTreeMap<String, ByteString> = data
            .into_iter()
            .map(|(key, value)| (key, ByteString(value.into_bytes())))
            .collect();
        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            data: (!folded.is_empty()).then_some(folded),
            ..Default::default()
        };
        self.secrets
            .lock()
            .unwrap()
            .insert((namespace.to_string(), name.to_string()), secret.clone());
        Ok(Some(secret))
    }

    async fn merge_patch_secret(
        &self,
        namespace: &str,
        name: &str,
        patch: Value,
    ) -> Result<Secret> {
        self.log(format!("merge_patch_secret {namespace}/{name}"));
        let mut secrets = self.secrets.lock().unwrap();
        let secret = secrets
            .get(&(namespace.to_string(), name.to_string()))
            .with_context(|| format!("secret {namespace}/{name} not found"))?;

        let mut value = serde_json::to_value(secret)?;
        json_patch::merge(&mut value, &patch);
        let mut patched: Secret = serde_json::from_value(value)?;
        if let Some(string_data) = patched.string_data.take() {
            let data = patched.data.get_or_insert_with(BTreeMap::new);
            for (key, text) in string_data {
                data.insert(key, ByteString(text.into_bytes()));
            }
        }
        secrets.insert((namespace.to_string(), name.to_string()), patched.clone());
        Ok(patched)
    }

    async fn json_patch_secret(
        &self,
        namespace: &str,
        name: &str,
        patch: json_patch::Patch,
    ) -> Result<Secret> {
        self.log(format!("json_patch_secret {namespace}/{name}"));
        let mut secrets = self.secrets.lock().unwrap();
        let secret = secrets
            .get(&(namespace.to_string(), name.to_string()))
            .with_context(|| format!("secret {namespace}/{name} not found"))?;

        let mut value = serde_json::to_value(secret)?;
        json_patch::patch(&mut value, &patch.0)
            .with_context(|| format!("patch did not apply to secret {namespace}/{name}"))?;
        let patched: Secret = serde_json::from_value(value)?;
        secrets.insert((namespace.to_string(), name.to_string()), patched.clone());
        Ok(patched)
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> Result<()> {
        self.log(format!("delete_secret {namespace}/{name}"));
        self.secrets
            .lock()
            .unwrap()
            .remove(&(namespace.to_string(), name.to_string()))
            .with_context(|| format!("secret {namespace}/{name} not found"))?;
        Ok(())
    }

    async fn list_client_records(&self, namespace: &str) -> Result<Vec<Value>> {
        self.log(format!("list_client_records {namespace}"));
        if namespace == self.records_namespace {
            Ok(self.records.lock().unwrap().clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn current_namespace(&self) -> String {
        self.log("current_namespace".to_string());
        self.ambient_namespace.clone()
    }
}

/// Scripted identity provider whose registry is a plain record vector.
#[allow(dead_code)] // Only the workflow test binary drives a provider
pub struct FakeIdentityProvider {
    records: Arc<Mutex<Vec<Value>>>,
    journal: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)] // Only the workflow test binary drives a provider
impl FakeIdentityProvider {
    /// Provider writing into the store's record vector, like a provider
    /// whose storage backend is the cluster itself.
    pub fn sharing(store: &FakeClusterStore) -> Self {
        Self {
            records: Arc::clone(&store.records),
            journal: Arc::clone(&store.journal),
        }
    }

    /// Provider with a registry of its own that the store never sees.
    pub fn detached(store: &FakeClusterStore) -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            journal: Arc::clone(&store.journal),
        }
    }

    /// Ids the provider currently has registered.
    pub fn record_ids(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter_map(|record| record.get("id").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect()
    }

    fn log(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn get_version(&self) -> Result<VersionInfo> {
        self.log("provider get_version".to_string());
        Ok(VersionInfo {
            server: "fake".to_string(),
            api: 2,
        })
    }

    async fn create_client(&self, client: &ClientIdentity) -> Result<CreateClientResponse> {
        self.log(format!("provider create_client {}", client.id));
        let mut records = self.records.lock().unwrap();
        let exists = records
            .iter()
            .any(|record| record.get("id").and_then(Value::as_str) == Some(client.id.as_str()));
        if exists {
            return Ok(CreateClientResponse {
                client: None,
                already_exists: true,
            });
        }
        records.push(json!({
            "id": client.id,
            "secret": client.secret,
            "redirect_uris": client.redirect_uris,
            "name": client.name,
        }));
        Ok(CreateClientResponse {
            client: Some(client.clone()),
            already_exists: false,
        })
    }

    async fn delete_client(&self, id: &str) -> Result<DeleteClientResponse> {
        self.log(format!("provider delete_client {id}"));
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|record| record.get("id").and_then(Value::as_str) != Some(id));
        Ok(DeleteClientResponse {
            not_found: records.len() == before,
        })
    }
}
