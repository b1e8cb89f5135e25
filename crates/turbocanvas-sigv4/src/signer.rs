//! SigV4 canonicalization, key derivation and signing.
//!
//! The pipeline is:
//!
//! 1. establish `host`, `x-amz-date` (and `x-amz-security-token`) on the request
//! 2. build a [`SigningContext`] from the request and [`SigningParams`]
//! 3. render the canonical request and the string-to-sign
//! 4. derive the signing key through the HMAC chain and sign
//! 5. write the `authorization` header
//!
//! Every function except [`sign`] is pure, so each step can be pinned
//! independently in tests.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use http::HeaderMap;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::debug;

use crate::{
    ALGORITHM, CanonicalizationPolicy, Credentials, SCOPE_TERMINATOR, SIGNED_HEADERS,
    SignableRequest, SigningError, headers,
};

type HmacSha256 = Hmac<Sha256>;

/// Per-call signing inputs that are not part of the request itself.
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
    /// Region in the credential scope (e.g. `ap-northeast-1`).
    pub region: &'a str,
    /// Service in the credential scope (e.g. `execute-api`, `bedrock`).
    pub service: &'a str,
    /// Signing time.
    pub timestamp: DateTime<Utc>,
    /// Target-specific canonicalization rules.
    pub policy: CanonicalizationPolicy,
}

/// Everything the canonical request and string-to-sign are derived from.
///
/// Built fresh for each request and dropped after signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// HTTP method, uppercase.
    pub method: String,
    /// Canonical URI after applying the policy.
    pub canonical_uri: String,
    /// Canonical query string after applying the policy.
    pub canonical_query: String,
    /// `name:value\n` lines for each signed header that is present.
    pub canonical_headers: String,
    /// `;`-joined signed header names.
    pub signed_headers: String,
    /// Hex SHA-256 of the body.
    pub payload_hash: String,
    /// Scope region.
    pub region: String,
    /// Scope service.
    pub service: String,
    /// `YYYYMMDD'T'HHMMSS'Z'`
    pub amz_date: String,
    /// `YYYYMMDD`
    pub date_stamp: String,
}

impl SigningContext {
    /// Capture the signing inputs from a request whose `host` and
    /// `x-amz-date` headers have already been established.
    pub fn from_request(request: &SignableRequest, params: &SigningParams<'_>) -> Self {
        let amz_date = amz_date(&params.timestamp);
        let date_stamp = amz_date[..8].to_string();

        Self {
            method: request.method.as_str().to_string(),
            canonical_uri: canonical_uri(request.url.path(), params.policy),
            canonical_query: canonical_query(request.url.query(), params.policy),
            canonical_headers: canonical_headers(&request.headers),
            signed_headers: SIGNED_HEADERS.join(";"),
            payload_hash: hex_sha256(&request.body),
            region: params.region.to_string(),
            service: params.service.to_string(),
            amz_date,
            date_stamp,
        }
    }

    /// `dateStamp/region/service/aws4_request`
    pub fn credential_scope(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.date_stamp, self.region, self.service, SCOPE_TERMINATOR
        )
    }

    /// The canonical request. `canonical_headers` already ends with `\n`,
    /// so the rendered string contains a blank line before the signed headers.
    pub fn canonical_request(&self) -> String {
        [
            self.method.as_str(),
            self.canonical_uri.as_str(),
            self.canonical_query.as_str(),
            self.canonical_headers.as_str(),
            self.signed_headers.as_str(),
            self.payload_hash.as_str(),
        ]
        .join("\n")
    }

    /// The string-to-sign for a rendered canonical request.
    pub fn string_to_sign(&self, canonical_request: &str) -> String {
        [
            ALGORITHM,
            self.amz_date.as_str(),
            self.credential_scope().as_str(),
            hex_sha256(canonical_request.as_bytes()).as_str(),
        ]
        .join("\n")
    }
}

/// Result of a successful signing operation.
///
/// Carries the intermediate strings for diagnostics. Neither the secret key
/// nor the derived signing key is retained.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    value: String,
    credential_scope: String,
    signed_headers: String,
    canonical_request: String,
    string_to_sign: String,
}

impl Signature {
    /// Lowercase hex signature.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Credential scope the signature is bound to.
    pub fn credential_scope(&self) -> &str {
        &self.credential_scope
    }

    /// `;`-joined signed header names.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// Canonical request the signature was computed over.
    pub fn canonical_request(&self) -> &str {
        &self.canonical_request
    }

    /// String-to-sign the signature was computed over.
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature")
            .field("value", &self.value)
            .field("credential_scope", &self.credential_scope)
            .field("signed_headers", &self.signed_headers)
            .finish_non_exhaustive()
    }
}

/// Sign `request` in place.
///
/// Sets `host`, `x-amz-date`, `x-amz-security-token` (only when the
/// credentials carry a session token, and never signed) and `authorization`.
///
/// # Errors
///
/// Returns [`SigningError::MissingHost`] when the URL has no host, or an
/// invalid-header error when a credential cannot be carried in a header.
/// On any error the request headers are left exactly as they were and the
/// request must not be sent.
pub fn sign(
    request: &mut SignableRequest,
    credentials: &Credentials,
    params: &SigningParams<'_>,
) -> Result<Signature, SigningError> {
    let host = request
        .url
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SigningError::MissingHost(request.url.to_string()))?;

    debug!(
        region = params.region,
        service = params.service,
        access_key_suffix = credentials.access_key_suffix(),
        "starting SigV4 signing"
    );

    let original = request.headers.clone();
    let signed = write_signature(request, &host, credentials, params);
    if signed.is_err() {
        request.headers = original;
    }
    signed
}

fn write_signature(
    request: &mut SignableRequest,
    host: &str,
    credentials: &Credentials,
    params: &SigningParams<'_>,
) -> Result<Signature, SigningError> {
    let amz_date = amz_date(&params.timestamp);
    request.set_header(headers::HOST, host)?;
    request.set_header(headers::X_AMZ_DATE, &amz_date)?;
    match credentials.session_token() {
        Some(token) => request.set_header(headers::X_AMZ_SECURITY_TOKEN, token.expose_secret())?,
        None => {
            request.headers.remove(headers::X_AMZ_SECURITY_TOKEN);
        }
    }

    let context = SigningContext::from_request(request, params);
    let canonical_request = context.canonical_request();
    let string_to_sign = context.string_to_sign(&canonical_request);
    debug!(canonical_request = %canonical_request, "built canonical request");

    let signing_key = derive_signing_key(
        credentials.secret_key().expose_secret(),
        &context.date_stamp,
        &context.region,
        &context.service,
    );
    let value = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    let credential_scope = context.credential_scope();
    let authorization = format!(
        "{ALGORITHM} Credential={}/{}, SignedHeaders={}, Signature={}",
        credentials.access_key(),
        credential_scope,
        context.signed_headers,
        value
    );
    request.set_header(headers::AUTHORIZATION, &authorization)?;

    Ok(Signature {
        value,
        credential_scope,
        signed_headers: context.signed_headers,
        canonical_request,
        string_to_sign,
    })
}

/// `YYYYMMDD'T'HHMMSS'Z'` in UTC.
pub fn amz_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y%m%dT%H%M%SZ").to_string()
}

/// URL path (or `/` when empty), with `:` → `%3A` when the policy asks for it.
pub fn canonical_uri(path: &str, policy: CanonicalizationPolicy) -> String {
    let path = if path.is_empty() { "/" } else { path };
    if policy.escape_colon {
        path.replace(':', "%3A")
    } else {
        path.to_string()
    }
}

/// The raw query string when the policy includes it, otherwise empty.
pub fn canonical_query(query: Option<&str>, policy: CanonicalizationPolicy) -> String {
    if policy.include_query {
        query.unwrap_or_default().to_string()
    } else {
        String::new()
    }
}

/// `name:trimmed-value\n` for each signed header present on the request.
pub fn canonical_headers(headers: &HeaderMap) -> String {
    SIGNED_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| format!("{}:{}\n", name, v.trim()))
        })
        .collect()
}

/// HMAC chain: `AWS4{secret}` → date → region → service → `aws4_request`.
pub fn derive_signing_key(secret: &str, date_stamp: &str, region: &str, service: &str) -> Vec<u8> {
    let k_secret = format!("AWS4{secret}");
    let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, SCOPE_TERMINATOR.as_bytes())
}

/// Lowercase hex SHA-256.
pub fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
