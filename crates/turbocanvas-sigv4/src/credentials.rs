//! Temporary AWS credentials used for a single signing operation.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Number of trailing access-key characters that may appear in diagnostics.
const SUFFIX_LEN: usize = 4;

/// Access key, secret key and optional session token.
///
/// Secrets are held in [`SecretString`] so they are zeroized on drop and
/// never appear in `Debug` output. Credentials are supplied per call and
/// are never persisted by this crate.
#[derive(Clone)]
pub struct Credentials {
    access_key: String,
    secret_key: SecretString,
    session_token: Option<SecretString>,
}

impl Credentials {
    /// Create credentials from raw parts.
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: SecretString::new(secret_key.into().into_boxed_str()),
            session_token: session_token.map(|t| SecretString::new(t.into_boxed_str())),
        }
    }

    /// The access key id.
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The secret access key.
    pub fn secret_key(&self) -> &SecretString {
        &self.secret_key
    }

    /// The session token, if these are temporary credentials.
    pub fn session_token(&self) -> Option<&SecretString> {
        self.session_token.as_ref()
    }

    /// The last few characters of the access key, safe to log.
    pub fn access_key_suffix(&self) -> &str {
        let start = self
            .access_key
            .char_indices()
            .rev()
            .nth(SUFFIX_LEN - 1)
            .map(|(i, _)| i)
            .unwrap_or(0);
        &self.access_key[start..]
    }

    /// False when either the access key or the secret key is blank.
    pub fn is_usable(&self) -> bool {
        !self.access_key.trim().is_empty() && !self.secret_key.expose_secret().trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &format_args!("****{}", self.access_key_suffix()))
            .field("secret_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
