//! Structured logging for invocations
//!
//! Every request and response is logged through this module so that secrets
//! are masked in one place: the `authorization` value is reduced to the
//! access-key suffix and the session token is never printed.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use turbocanvas_sigv4::{SignableRequest, headers};

/// Request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// HTTP method
    pub method: String,
    /// Request host
    pub host: String,
    /// Request path
    pub path: String,
    /// Request body size in bytes
    pub body_size: usize,
    /// Masked `authorization` header, if the request is signed
    pub authorization: Option<String>,
    /// Whether a session token header is present
    pub has_session_token: bool,
}

impl RequestMetadata {
    /// Capture loggable fields from a request.
    pub fn from_signable(request: &SignableRequest) -> Self {
        Self {
            method: request.method.to_string(),
            host: request.url.host_str().unwrap_or_default().to_string(),
            path: request.url.path().to_string(),
            body_size: request.body.len(),
            authorization: request.header(headers::AUTHORIZATION).map(mask_authorization),
            has_session_token: request.header(headers::X_AMZ_SECURITY_TOKEN).is_some(),
        }
    }

    /// Log request being sent
    pub fn log_request(&self) {
        debug!(
            method = %self.method,
            host = %self.host,
            path = %self.path,
            body_size = self.body_size,
            authorization = self.authorization.as_deref(),
            has_session_token = self.has_session_token,
            "Sending signed request"
        );
    }
}

/// Response metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// HTTP status code
    pub status: u16,
    /// Response body size in bytes
    pub body_size: usize,
    /// Time elapsed for the request
    pub elapsed: Duration,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(status: u16, body_size: usize, elapsed: Duration) -> Self {
        Self {
            status,
            body_size,
            elapsed,
        }
    }

    /// Log a decoded image
    pub fn log_success(&self, target: &str, path: &str, image_size: usize) {
        info!(
            target_kind = %target,
            path = %path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            image_size,
            "Image generated"
        );
    }

    /// Log failed invocation
    pub fn log_error(&self, target: &str, path: &str, error: &str) {
        warn!(
            target_kind = %target,
            path = %path,
            status = self.status,
            elapsed_ms = self.elapsed.as_millis(),
            error = %error,
            "Image generation failed"
        );
    }
}

/// Log an invocation that failed before any response status arrived
pub fn log_transport_error(target: &str, path: &str, invoker: &str, elapsed: Duration, error: &str) {
    warn!(
        target_kind = %target,
        path = %path,
        invoker = invoker,
        elapsed_ms = elapsed.as_millis(),
        error = %error,
        "Image generation failed before a response was received"
    );
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Reduce an `authorization` value to something safe to log.
///
/// `AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/2024.../aws4_request, ...`
/// becomes `AWS4-HMAC-SHA256 Credential=****MPLE/...`.
pub fn mask_authorization(value: &str) -> String {
    let Some((algorithm, rest)) = value.split_once(' ') else {
        return "**MASKED**".to_string();
    };
    let suffix = rest
        .strip_prefix("Credential=")
        .and_then(|c| c.split('/').next())
        .map(|key| {
            let start = key.len().saturating_sub(4);
            key.get(start..).unwrap_or_default()
        })
        .unwrap_or_default();
    format!("{algorithm} Credential=****{suffix}/...")
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing if a global subscriber is already set.
#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mask_authorization() {
        let value = "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240102/us-east-1/bedrock/aws4_request, \
                     SignedHeaders=content-type;host;x-amz-date, Signature=abcdef";
        let masked = mask_authorization(value);
        assert_eq!(masked, "AWS4-HMAC-SHA256 Credential=****MPLE/...");
        assert!(!masked.contains("AKIDEXAMPLE"));
        assert!(!masked.contains("abcdef"));
    }

    #[test]
    fn test_mask_unexpected_value() {
        assert_eq!(mask_authorization("Bearer"), "**MASKED**");
        assert_eq!(
            mask_authorization("Bearer secret-token"),
            "Bearer Credential=****/..."
        );
    }

    #[test]
    fn test_request_metadata_masks_secrets() {
        let mut request = SignableRequest::post(
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/m/invoke"
                .parse()
                .unwrap(),
            b"{}".to_vec(),
        );
        request
            .set_header(
                "authorization",
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/x, Signature=ff",
            )
            .unwrap();
        request.set_header("x-amz-security-token", "very-secret").unwrap();

        let metadata = RequestMetadata::from_signable(&request);
        assert_eq!(metadata.method, "POST");
        assert_eq!(metadata.host, "bedrock-runtime.us-east-1.amazonaws.com");
        assert_eq!(metadata.path, "/model/m/invoke");
        assert_eq!(metadata.body_size, 2);
        assert!(metadata.has_session_token);
        let rendered = format!("{metadata:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("AKIDEXAMPLE"));
    }

    #[test]
    fn test_response_metadata_creation() {
        let metadata = ResponseMetadata::new(200, 42, Duration::from_millis(500));
        assert_eq!(metadata.status, 200);
        assert_eq!(metadata.body_size, 42);
        assert_eq!(metadata.elapsed, Duration::from_millis(500));
    }

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed().as_millis() >= 10);
    }
}
