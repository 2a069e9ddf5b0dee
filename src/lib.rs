//! OAuth2 Client Reconciliation Library
//!
//! Core functionality for `occtl`: registering OAuth2 clients with a
//! Dex-style identity provider and reconciling their credentials into
//! Kubernetes secrets.
//!
//! The library is organized around three collaborators:
//!
//! - [`registrar::ClientRegistrar`] registers and unregisters clients with
//!   the identity provider
//! - [`resolver::IdentityResolver`] recovers the stored client record from
//!   the cluster
//! - [`reconciler::SecretReconciler`] projects credentials into a secret and
//!   strips them out again
//!
//! [`workflow`] composes them into the top-level `create` and `delete`
//! sequences. Unit tests live next to the modules; workflow-level tests use
//! in-memory fakes under `tests/`.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod reconciler;
pub mod registrar;
pub mod resolver;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
