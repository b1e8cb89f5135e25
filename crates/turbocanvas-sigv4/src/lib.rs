#![deny(unsafe_code)]
#![warn(missing_docs)]

//! AWS Signature Version 4 signing for the TurboCanvas ecosystem.
//!
//! This crate implements SigV4 from first principles: canonical request,
//! string-to-sign, the HMAC-SHA256 key derivation chain and the final
//! `Authorization` header. It performs no I/O.
//!
//! Two things differ between invocation targets and are expressed as data
//! rather than separate code paths:
//!
//! - the service name in the credential scope (`execute-api`, `bedrock`)
//! - the [`CanonicalizationPolicy`] (colon escaping in the path, whether the
//!   query string participates in the signature)
//!
//! # Example
//!
//! ```rust
//! use turbocanvas_sigv4::{
//!     CanonicalizationPolicy, Credentials, SignableRequest, SigningParams, sign,
//! };
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("AKIDEXAMPLE", "secret", None);
//! let mut request = SignableRequest::post(
//!     "https://abc123.execute-api.ap-northeast-1.amazonaws.com/dev/generateImage".parse()?,
//!     br#"{"prompt":"cat"}"#.to_vec(),
//! );
//! request.set_header("content-type", "application/json")?;
//!
//! let params = SigningParams {
//!     region: "ap-northeast-1",
//!     service: "execute-api",
//!     timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
//!     policy: CanonicalizationPolicy::PROXY,
//! };
//! let signature = sign(&mut request, &credentials, &params)?;
//! assert_eq!(signature.as_str().len(), 64);
//! assert!(request.headers.contains_key("authorization"));
//! # Ok(())
//! # }
//! ```

mod credentials;
mod error;
mod policy;
mod request;
pub mod signer;

pub use credentials::Credentials;
pub use error::SigningError;
pub use policy::CanonicalizationPolicy;
pub use request::SignableRequest;
pub use signer::{Signature, SigningContext, SigningParams, derive_signing_key, sign};

/// The only signing algorithm this crate produces.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Terminal component of every credential scope.
pub const SCOPE_TERMINATOR: &str = "aws4_request";

/// Headers covered by every signature, already in canonical (alphabetical) order.
///
/// `x-amz-security-token` is set on the request when a session token exists
/// but is never part of this list.
pub const SIGNED_HEADERS: [&str; 3] = ["content-type", "host", "x-amz-date"];

/// Hex SHA-256 of an empty payload.
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Header names written by [`sign`].
pub mod headers {
    /// `Authorization`
    pub const AUTHORIZATION: &str = "authorization";
    /// `Host`
    pub const HOST: &str = "host";
    /// `X-Amz-Date`
    pub const X_AMZ_DATE: &str = "x-amz-date";
    /// `X-Amz-Security-Token`
    pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
}

/// Convenient re-exports of commonly used items.
pub mod prelude {
    pub use crate::{
        CanonicalizationPolicy, Credentials, Signature, SignableRequest, SigningError,
        SigningParams, sign,
    };
}
