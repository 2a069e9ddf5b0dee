//! # Errors
//!
//! Error types for the reconciliation workflows.
//!
//! Idempotent conditions (client already exists, secret already absent, ...)
//! are not errors; they are outcome enum values on the components that
//! produce them. The variants here are the failures callers must be able to
//! tell apart. Anything else travels as a contextualized [`anyhow::Error`]
//! through the `Other` variant.

use thiserror::Error;

/// Result alias used across the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures the create and delete workflows distinguish
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No stored OAuth2Client record matched the logical id after a full scan
    #[error("could not find OAuth2Client in namespace '{namespace}' with id '{id}'")]
    ClientRecordNotFound {
        /// Namespace that was scanned
        namespace: String,
        /// Logical client id that was requested
        id: String,
    },

    /// The client is registered at the provider but its stored record could
    /// not be found, so the generated credentials cannot be recovered
    #[error(
        "OAuth2Client '{id}' is registered but its credentials could not be recovered \
         from namespace '{namespace}'; occtl cannot resolve this, please investigate \
         cluster state manually"
    )]
    CredentialsUnrecoverable {
        /// Namespace that was scanned for the record
        namespace: String,
        /// Logical client id that was registered
        id: String,
    },

    /// The supplied client definition cannot be used
    #[error("invalid client definition: {0}")]
    InvalidDefinition(String),

    /// Any other failure from a collaborator, with context attached
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Create a record-not-found error for the given namespace and id
    pub fn record_not_found(namespace: impl Into<String>, id: impl Into<String>) -> Self {
        Self::ClientRecordNotFound {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// Create a credentials-unrecoverable error for the given namespace and id
    pub fn credentials_unrecoverable(
        namespace: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::CredentialsUnrecoverable {
            namespace: namespace.into(),
            id: id.into(),
        }
    }

    /// Create an invalid-definition error with the given reason
    pub fn invalid_definition(reason: impl Into<String>) -> Self {
        Self::InvalidDefinition(reason.into())
    }
}
