//! Error types for request signing

use thiserror::Error;

/// Errors that abort a signing operation.
///
/// Every variant is a configuration problem: retrying with the same inputs
/// produces the same error, and the request must not be sent unsigned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// The request URL has no host to bind the signature to.
    #[error("cannot sign request: URL '{0}' has no resolvable host")]
    MissingHost(String),

    /// A header name could not be represented as an HTTP header.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A header value could not be represented as an HTTP header.
    #[error("invalid value for header '{0}'")]
    InvalidHeaderValue(String),
}
