//! Credential sources
//!
//! The client asks a [`CredentialSource`] for credentials once per call and
//! never caches the result. Caching, refresh and identity-pool exchanges are
//! the source's own business.

use std::env;
use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

pub use secrecy::{ExposeSecret, SecretString};
pub use turbocanvas_sigv4::Credentials;

use crate::error::CredentialError;

/// Environment variable holding the access key id.
pub const ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable holding the secret access key.
pub const SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable holding the optional session token.
pub const SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";

/// Asynchronous provider of signing credentials.
///
/// Implementations must be safe to call concurrently.
///
/// - `Err(_)` is an explicit provider failure.
/// - `Ok(None)` means the provider succeeded but has nothing to offer.
#[async_trait]
pub trait CredentialSource: Send + Sync + fmt::Debug {
    /// Fetch the current credentials.
    async fn fetch(&self) -> Result<Option<Credentials>, CredentialError>;

    /// Name used in logs.
    fn source_name(&self) -> &'static str;
}

/// Fetch from `source` and reject absent or unusable credentials.
pub async fn resolve_credentials(
    source: &dyn CredentialSource,
) -> Result<Credentials, CredentialError> {
    let credentials = match source.fetch().await {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            warn!(source = source.source_name(), "Credential source returned nothing");
            return Err(CredentialError::Missing);
        }
        Err(e) => {
            warn!(source = source.source_name(), error = %e, "Credential source failed");
            return Err(e);
        }
    };

    if !credentials.is_usable() {
        return Err(CredentialError::Unusable(
            "access key or secret key is empty".to_string(),
        ));
    }

    debug!(
        source = source.source_name(),
        access_key_suffix = credentials.access_key_suffix(),
        has_session_token = credentials.session_token().is_some(),
        "Credentials resolved"
    );
    Ok(credentials)
}

/// Fixed credentials supplied by the caller.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Wrap existing credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Build from raw key material.
    pub fn from_keys(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self::new(Credentials::new(access_key, secret_key, session_token))
    }
}

#[async_trait]
impl CredentialSource for StaticCredentials {
    async fn fetch(&self) -> Result<Option<Credentials>, CredentialError> {
        Ok(Some(self.credentials.clone()))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

/// Credentials read from the standard AWS environment variables on every fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    /// Create a new environment source.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CredentialSource for EnvCredentials {
    async fn fetch(&self) -> Result<Option<Credentials>, CredentialError> {
        let (Ok(access_key), Ok(secret_key)) =
            (env::var(ACCESS_KEY_ID_ENV), env::var(SECRET_ACCESS_KEY_ENV))
        else {
            return Ok(None);
        };
        let session_token = env::var(SESSION_TOKEN_ENV).ok().filter(|t| !t.is_empty());

        Ok(Some(Credentials::new(access_key, secret_key, session_token)))
    }

    fn source_name(&self) -> &'static str {
        "environment"
    }
}
