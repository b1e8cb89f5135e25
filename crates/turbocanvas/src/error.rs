//! Error types for the TurboCanvas client
//!
//! Every invocation ends in exactly one `Result`; nothing in this crate
//! converts a failure into a default value, and nothing retries.

use std::fmt;
use thiserror::Error;

pub use turbocanvas_sigv4::SigningError;

/// Result type alias for operations that can fail with a TurboCanvas error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the TurboCanvas client.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing, placeholder or malformed configuration (endpoint, path, model, region).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid generation parameters, rejected before any network activity.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The credential source failed or produced nothing usable.
    #[error("Credential error: {0}")]
    Credentials(#[from] CredentialError),

    /// The request could not be signed; it was not sent.
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// Transport failure before a response status was received.
    ///
    /// Any [`HttpInvoker`](crate::http::HttpInvoker) can report one through
    /// [`Error::network`].
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with a non-2xx status, or with an error message envelope.
    #[error("Service error (status {status}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Raw body or the service's `message` field
        message: String,
    },

    /// The caller is not authorized to invoke the target.
    #[error("Permission denied: {0}")]
    PermissionDenied(Box<PermissionDenied>),

    /// The response body matched none of the known envelopes.
    #[error("Unrecognized response format: {body}")]
    ResponseFormat {
        /// Raw response body, echoed for diagnostics
        body: String,
    },

    /// An envelope matched but its base64 payload was invalid.
    #[error("Failed to decode image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The Lambda behind the proxy returned an explicit error.
    #[error("Lambda error: {0}")]
    Lambda(String),

    /// Failed to serialize the request payload.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of [`Error`], stable for matching by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Configuration`] and [`Error::InvalidRequest`].
    Configuration,
    /// See [`Error::Credentials`].
    Credential,
    /// See [`Error::Signing`].
    Signing,
    /// See [`Error::Network`].
    Network,
    /// See [`Error::Service`].
    Service,
    /// See [`Error::PermissionDenied`].
    PermissionDenied,
    /// See [`Error::ResponseFormat`].
    ResponseFormat,
    /// See [`Error::Decode`].
    Decode,
    /// See [`Error::Lambda`].
    Lambda,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) | Error::InvalidRequest(_) | Error::Serialization(_) => {
                ErrorKind::Configuration
            }
            Error::Credentials(_) => ErrorKind::Credential,
            Error::Signing(_) => ErrorKind::Signing,
            Error::Network(_) => ErrorKind::Network,
            Error::Service { .. } => ErrorKind::Service,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::ResponseFormat { .. } => ErrorKind::ResponseFormat,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Lambda(_) => ErrorKind::Lambda,
        }
    }

    /// Wrap a transport failure from any invoker.
    pub fn network(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Network(err.into())
    }

    /// True for [`Error::Service`] and its [`Error::PermissionDenied`] refinement.
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Service { .. } | Error::PermissionDenied(_))
    }

    /// HTTP status, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service { status, .. } => Some(*status),
            Error::PermissionDenied(denied) => Some(denied.status),
            Error::Network(e) => e
                .downcast_ref::<reqwest::Error>()
                .and_then(reqwest::Error::status)
                .map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Structured permission details, if this is a permission error.
    pub fn permission_denied(&self) -> Option<&PermissionDenied> {
        match self {
            Error::PermissionDenied(denied) => Some(denied),
            _ => None,
        }
    }
}

/// Why credentials could not be obtained.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential source reported a failure.
    #[error("credential source failed: {0}")]
    Provider(#[source] anyhow::Error),

    /// The credential source succeeded but returned nothing.
    #[error("credential source returned no credentials")]
    Missing,

    /// Credentials were returned but cannot sign a request.
    #[error("credentials are not usable: {0}")]
    Unusable(String),
}

impl CredentialError {
    /// Wrap an arbitrary provider failure.
    pub fn provider(err: impl Into<anyhow::Error>) -> Self {
        CredentialError::Provider(err.into())
    }
}

/// Details of an authorization-denied response for the invoke action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDenied {
    /// HTTP status code (usually 403)
    pub status: u16,
    /// IAM action that was denied (e.g. `bedrock:InvokeModel`)
    pub action: String,
    /// Principal ARN named in the denial, when present
    pub principal: Option<String>,
    /// Resource ARN named in the denial, when present
    pub resource: Option<String>,
    /// Steps the caller can show to resolve the denial
    pub remediation: Vec<Remediation>,
    /// Raw response body
    pub raw_body: String,
}

impl fmt::Display for PermissionDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not authorized to perform {}", self.action)?;
        if let Some(resource) = &self.resource {
            write!(f, " on {resource}")?;
        }
        Ok(())
    }
}

impl From<PermissionDenied> for Error {
    fn from(denied: PermissionDenied) -> Self {
        Error::PermissionDenied(Box::new(denied))
    }
}

/// A single remediation step for a [`PermissionDenied`] error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remediation {
    /// Grant the action in the identity policy attached to the caller's role.
    GrantIdentityPolicy {
        /// Action to allow
        action: String,
        /// Principal to attach the policy to, when known
        principal: Option<String>,
    },
    /// Allow the caller in the resource policy of the target.
    CheckResourcePolicy {
        /// Resource whose policy should be checked, when known
        resource: Option<String>,
    },
    /// Request access to the model in the Bedrock console for the region.
    EnableModelAccess {
        /// Model identifier
        model_id: String,
    },
}

impl fmt::Display for Remediation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remediation::GrantIdentityPolicy { action, principal } => {
                write!(f, "Allow '{action}' in the IAM policy")?;
                if let Some(principal) = principal {
                    write!(f, " attached to {principal}")?;
                }
                Ok(())
            }
            Remediation::CheckResourcePolicy { resource } => match resource {
                Some(resource) => write!(f, "Check the resource policy of {resource}"),
                None => write!(f, "Check the resource policy of the invoked endpoint"),
            },
            Remediation::EnableModelAccess { model_id } => {
                write!(f, "Enable model access for '{model_id}' in the Bedrock console")
            }
        }
    }
}
