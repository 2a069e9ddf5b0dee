//! # Constants
//!
//! Shared defaults and identifiers used throughout the CLI.
//!
//! The managed-key names and the provider address can be overridden per
//! invocation; the record schema constants describe how Dex-style identity
//! providers store their client objects and are fixed.

/// Default Secret data key holding the OAuth2 client id
pub const DEFAULT_CLIENT_ID_KEY: &str = "client_id";

/// Default Secret data key holding the OAuth2 client secret
pub const DEFAULT_CLIENT_SECRET_KEY: &str = "client_secret";

/// Default identity provider API address (overridable via `--address` or `OCCTL_ADDR`)
pub const DEFAULT_PROVIDER_ADDRESS: &str = "https://127.0.0.1:5557";

/// API group of the provider's stored client records
pub const OAUTH2_CLIENT_GROUP: &str = "dex.coreos.com";

/// API version of the provider's stored client records
pub const OAUTH2_CLIENT_VERSION: &str = "v1";

/// Kind of the provider's stored client records
pub const OAUTH2_CLIENT_KIND: &str = "OAuth2Client";

/// Plural resource name of the provider's stored client records
pub const OAUTH2_CLIENT_PLURAL: &str = "oauth2clients";
