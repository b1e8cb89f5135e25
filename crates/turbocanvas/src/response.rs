//! Response unwrapping
//!
//! A successful invocation can carry its image in several JSON envelopes.
//! Each envelope is a matcher; [`MATCH_ORDER`] lists them in the order they
//! are tried and the first match decides the outcome. Supporting a new
//! envelope means adding a variant and a slot in that list.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{Error, Result};

/// Known response envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Envelope {
    /// `{"body": "<json string>"}` from a Lambda proxy integration; the inner
    /// document carries `images` or `error`.
    LambdaProxy,
    /// `{"images": ["<base64>", ...]}`
    BareImages,
    /// `{"artifacts": [{"base64": "<base64>"}, ...]}`
    Artifacts,
    /// `{"message": "<text>"}`, a service-side error report.
    ServiceMessage,
}

/// Matchers in the order they are tried.
pub const MATCH_ORDER: [Envelope; 4] = [
    Envelope::LambdaProxy,
    Envelope::BareImages,
    Envelope::Artifacts,
    Envelope::ServiceMessage,
];

/// What a matching envelope resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Matched {
    Image(String),
    LambdaError(String),
    ServiceMessage(String),
}

impl Envelope {
    fn try_match(&self, object: &Map<String, Value>) -> Option<Matched> {
        match self {
            Envelope::LambdaProxy => {
                let inner = object.get("body")?.as_str()?;
                let inner: Value = serde_json::from_str(inner).ok()?;
                let inner = inner.as_object()?;
                if let Some(image) = first_string(inner.get("images")) {
                    return Some(Matched::Image(image.to_string()));
                }
                inner
                    .get("error")
                    .and_then(Value::as_str)
                    .map(|e| Matched::LambdaError(e.to_string()))
            }
            Envelope::BareImages => {
                first_string(object.get("images")).map(|image| Matched::Image(image.to_string()))
            }
            Envelope::Artifacts => object
                .get("artifacts")?
                .as_array()?
                .first()?
                .get("base64")?
                .as_str()
                .map(|image| Matched::Image(image.to_string())),
            Envelope::ServiceMessage => object
                .get("message")
                .and_then(Value::as_str)
                .map(|m| Matched::ServiceMessage(m.to_string())),
        }
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Envelope::LambdaProxy => "lambda-proxy",
            Envelope::BareImages => "images",
            Envelope::Artifacts => "artifacts",
            Envelope::ServiceMessage => "message",
        };
        f.write_str(name)
    }
}

fn first_string(value: Option<&Value>) -> Option<&str> {
    value?.as_array()?.first()?.as_str()
}

/// Decoded image bytes and the envelope they came from.
///
/// The bytes are opaque; no image format is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    data: Bytes,
    envelope: Envelope,
}

impl GeneratedImage {
    /// Image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the image bytes.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }

    /// Envelope the image was extracted from.
    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the decoded payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Decode base64, ignoring embedded ASCII whitespace.
///
/// # Errors
///
/// Returns [`Error::Decode`] for any other invalid input.
pub fn decode_image(encoded: &str) -> Result<Bytes> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    Ok(Bytes::from(STANDARD.decode(compact)?))
}

/// Extract the image from a 2xx response body.
///
/// `status` is only used to label a `message` envelope as a service error.
///
/// # Errors
///
/// - [`Error::Lambda`] for a proxy envelope with an `error` field
/// - [`Error::Service`] for a `message` envelope
/// - [`Error::Decode`] when a matched image is not valid base64
/// - [`Error::ResponseFormat`] when nothing matches, including non-JSON bodies
pub fn unwrap_response(status: u16, body: &[u8]) -> Result<GeneratedImage> {
    let format_error = || Error::ResponseFormat {
        body: String::from_utf8_lossy(body).into_owned(),
    };

    let document: Value = serde_json::from_slice(body).map_err(|_| format_error())?;
    let object = document.as_object().ok_or_else(format_error)?;

    for envelope in MATCH_ORDER {
        let Some(matched) = envelope.try_match(object) else {
            continue;
        };
        return match matched {
            Matched::Image(encoded) => Ok(GeneratedImage {
                data: decode_image(&encoded)?,
                envelope,
            }),
            Matched::LambdaError(message) => Err(Error::Lambda(message)),
            Matched::ServiceMessage(message) => Err(Error::Service { status, message }),
        };
    }

    Err(format_error())
}
