//! # OCCTL CLI
//!
//! Command-line surface for `occtl`.
//!
//! ## Usage
//!
//! ```bash
//! # Register a client and write its credentials into a secret
//! occtl create -n auth --secret-name dex-client -f client.yaml
//!
//! # Read the client definition from stdin
//! cat client.yaml | occtl create -n auth --secret-name dex-client
//!
//! # Strip the credentials and unregister the client
//! occtl delete -n auth --secret-name dex-client -f client.yaml
//! ```

use crate::config::ProviderConfig;
use crate::constants::{
    DEFAULT_CLIENT_ID_KEY, DEFAULT_CLIENT_SECRET_KEY, DEFAULT_PROVIDER_ADDRESS,
};
use crate::error::{Error, Result};
use crate::identity::ClientIdentity;
use crate::reconciler::ManagedKeys;
use crate::store::ObjectRef;
use crate::workflow::ReconcileTarget;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

/// Reconciles OAuth2 client registrations with Kubernetes secrets
#[derive(Debug, Parser)]
#[command(name = "occtl", version)]
#[command(
    about = "Reconciles OAuth2 client registrations with Kubernetes secrets",
    long_about = None,
    after_help = "\
The client definition is a YAML document with OAuth2Client properties:

  id: example-app
  secret: example-secret
  redirect_uris:
    - http://127.0.0.1:5555/callback
  name: Example App

Examples:
  occtl create -n auth --secret-name dex-client -f client.yaml
  cat client.yaml | occtl delete -n auth --secret-name dex-client
"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Address of the identity provider API
    #[arg(
        short,
        long,
        global = true,
        env = "OCCTL_ADDR",
        default_value = DEFAULT_PROVIDER_ADDRESS
    )]
    pub address: String,

    /// Path to a PEM bundle of additional trusted CA certificates
    #[arg(long, global = true, value_name = "PATH")]
    pub ca_cert: Option<PathBuf>,

    /// Path to the client TLS certificate; enables mutual TLS with --tls-key
    #[arg(long, global = true, value_name = "PATH")]
    pub tls_cert: Option<PathBuf>,

    /// Path to the client TLS private key; enables mutual TLS with --tls-cert
    #[arg(long, global = true, value_name = "PATH")]
    pub tls_key: Option<PathBuf>,
}

impl Cli {
    /// Provider connection settings assembled from the global flags.
    #[must_use]
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            address: self.address.clone(),
            ca_cert: self.ca_cert.clone(),
            tls_cert: self.tls_cert.clone(),
            tls_key: self.tls_key.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register an OAuth2 client and write its credentials into a secret
    Create(TargetArgs),
    /// Strip the credentials from the secret and unregister the client
    Delete(TargetArgs),
}

/// Arguments shared by `create` and `delete`.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Namespace of the stored OAuth2Client records. If unset, uses the
    /// kubeconfig context namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Secret carrying the OAuth2 client credentials. If unset, no secret is
    /// touched
    #[arg(long)]
    pub secret_name: Option<String>,

    /// Namespace for the secret. If unset, uses the same as '-n'
    #[arg(long)]
    pub secret_namespace: Option<String>,

    /// Secret key under which the client id is stored
    #[arg(long, default_value = DEFAULT_CLIENT_ID_KEY)]
    pub id_key: String,

    /// Secret key under which the client secret is stored
    #[arg(long, default_value = DEFAULT_CLIENT_SECRET_KEY)]
    pub secret_key: String,

    /// Path to the OAuth2Client definition YAML, '-' reads stdin
    #[arg(short, long, default_value = "-")]
    pub file: String,
}

impl TargetArgs {
    /// Cluster coordinates for a workflow run.
    ///
    /// The secret namespace falls back to the client record namespace when
    /// not given explicitly.
    #[must_use]
    pub fn reconcile_target(&self) -> ReconcileTarget {
        let secret_namespace = self
            .secret_namespace
            .clone()
            .or_else(|| self.namespace.clone());
        ReconcileTarget {
            client_namespace: self.namespace.clone(),
            secret: ObjectRef {
                namespace: secret_namespace,
                name: self.secret_name.clone(),
            },
            keys: ManagedKeys {
                id_key: self.id_key.clone(),
                secret_key: self.secret_key.clone(),
            },
        }
    }

    /// Reads and parses the client definition named by `--file`.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or the document is not a
    /// usable OAuth2Client definition.
    pub fn load_definition(&self) -> Result<ClientIdentity> {
        let document = if self.file == "-" {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("could not read OAuth2Client definition from stdin")?;
            buffer
        } else {
            std::fs::read_to_string(&self.file).with_context(|| {
                format!("could not read OAuth2Client definition from {}", self.file)
            })?
        };
        parse_definition(&document)
    }
}

/// Parses a YAML OAuth2Client definition.
///
/// # Errors
///
/// Returns an error when the document is not valid YAML or carries no client
/// id.
pub fn parse_definition(document: &str) -> Result<ClientIdentity> {
    let identity: ClientIdentity =
        serde_yaml::from_str(document).context("could not parse OAuth2Client definition")?;
    if identity.id.is_empty() {
        return Err(Error::invalid_definition(
            "OAuth2Client definition has no 'id'",
        ));
    }
    Ok(identity)
}
