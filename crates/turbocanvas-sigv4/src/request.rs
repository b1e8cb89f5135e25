//! The outgoing request that signing mutates.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

use crate::{SigningError, headers};

/// Headers whose values are redacted from `Debug` output.
const SENSITIVE_HEADERS: [&str; 2] = [headers::AUTHORIZATION, headers::X_AMZ_SECURITY_TOKEN];

/// An HTTP request in the exact form it will be sent.
///
/// A signature is only valid for the bytes it was computed over, so the
/// body and the signed headers must not change between [`crate::sign`]
/// and transmission.
#[derive(Debug, Clone)]
pub struct SignableRequest {
    /// HTTP method.
    pub method: Method,
    /// Full request URL (scheme, host, path, query).
    pub url: Url,
    /// Headers to send. Signing adds `host`, `x-amz-date`,
    /// `x-amz-security-token` and `authorization`.
    pub headers: HeaderMap,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl SignableRequest {
    /// Create a request with no headers.
    pub fn new(method: Method, url: Url, body: Vec<u8>) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Create a `POST` request.
    pub fn post(url: Url, body: Vec<u8>) -> Self {
        Self::new(Method::POST, url, body)
    }

    /// Insert or replace a header.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), SigningError> {
        let name: HeaderName = name
            .parse()
            .map_err(|_| SigningError::InvalidHeaderName(name.to_string()))?;
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| SigningError::InvalidHeaderValue(name.to_string()))?;
        if SENSITIVE_HEADERS.contains(&name.as_str()) {
            value.set_sensitive(true);
        }
        self.headers.insert(name, value);
        Ok(())
    }

    /// Header value as a string, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_is_case_insensitive() {
        let mut request = SignableRequest::post("https://example.com/".parse().unwrap(), vec![]);
        request.set_header("Content-Type", "application/json").unwrap();

        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_secret_headers_are_redacted_in_debug() {
        let mut request = SignableRequest::post("https://example.com/".parse().unwrap(), vec![]);
        request.set_header("Authorization", "AWS4-HMAC-SHA256 Credential=AKID").unwrap();
        request.set_header("x-amz-security-token", "token-value").unwrap();

        let rendered = format!("{request:?}");
        assert!(!rendered.contains("AKID"));
        assert!(!rendered.contains("token-value"));
        assert_eq!(request.header("x-amz-security-token"), Some("token-value"));
    }

    #[test]
    fn test_set_header_rejects_invalid_value() {
        let mut request = SignableRequest::post("https://example.com/".parse().unwrap(), vec![]);
        let err = request.set_header("x-test", "bad\nvalue").unwrap_err();
        assert_eq!(err, SigningError::InvalidHeaderValue("x-test".to_string()));
    }
}
