//! # OCCTL
//!
//! Binary entry point. Registers OAuth2 clients with a Dex-style identity
//! provider and reconciles their credentials into Kubernetes secrets. See
//! [`oauth_client_ctl::cli`] for the command surface.

use anyhow::{Context, Result};
use clap::Parser;
use kube::Client;
use oauth_client_ctl::cli::{Cli, Commands};
use oauth_client_ctl::identity::rest::IdentityProviderREST;
use oauth_client_ctl::store::kube::KubeClusterStore;
use oauth_client_ctl::workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure rustls crypto provider FIRST, before any other operations
    // Required for rustls 0.23+ when no default provider is set via features
    // We use ring as the crypto provider
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "occtl=info,oauth_client_ctl=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let provider = IdentityProviderREST::new(&cli.provider_config())?;
    workflow::check_connection(&provider, &cli.address).await?;

    // Create Kubernetes client
    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.")?;
    let store = KubeClusterStore::new(client);

    match &cli.command {
        Commands::Create(args) => {
            let definition = args.load_definition()?;
            let target = args.reconcile_target();
            workflow::run_create(&provider, &store, &target, &definition).await?;
            Ok(())
        }
        Commands::Delete(args) => {
            let definition = args.load_definition()?;
            let target = args.reconcile_target();
            let summary = workflow::run_delete(&provider, &store, &target, &definition.id).await?;
            if summary.is_failure() {
                eprintln!(
                    "err: identity provider reported OAuth2Client {} did not exist.",
                    definition.id
                );
                std::process::exit(1);
            }
            println!("success: OAuth2Client {} deleted.", definition.id);
            Ok(())
        }
    }
}
