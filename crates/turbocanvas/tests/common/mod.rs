//! Common test utilities and helpers

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use turbocanvas::http::{HeaderMap, HttpInvoker, HttpResponse, StatusCode};
use turbocanvas::{
    CredentialError, CredentialSource, Credentials, ImageClient, InvocationTarget,
    SignableRequest, StaticCredentials,
};

/// Base64 of `ABC`
#[allow(dead_code)]
pub const ABC_BASE64: &str = "QUJD";

/// Model used for direct invocation tests
#[allow(dead_code)]
pub const MODEL_ID: &str = "stability.stable-diffusion-xl-v1:0";

/// Test access key
pub const ACCESS_KEY: &str = "AKIDEXAMPLE";

/// Test secret key
pub const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

/// Timestamp used by every test client
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

/// Static credentials, optionally with a session token
pub fn test_credentials(session_token: Option<&str>) -> StaticCredentials {
    StaticCredentials::from_keys(ACCESS_KEY, SECRET_KEY, session_token.map(str::to_string))
}

/// Client for `target` with a fixed clock and the default transport
#[allow(dead_code)]
pub fn client_for(target: InvocationTarget, session_token: Option<&str>) -> ImageClient {
    ImageClient::builder()
        .target(target)
        .credentials(test_credentials(session_token))
        .clock(fixed_time)
        .build()
        .expect("Failed to build test client")
}

/// Credential source that always fails
#[derive(Debug)]
#[allow(dead_code)]
pub struct FailingCredentials;

#[async_trait]
impl CredentialSource for FailingCredentials {
    async fn fetch(&self) -> Result<Option<Credentials>, CredentialError> {
        Err(CredentialError::provider(anyhow::anyhow!(
            "identity pool unavailable"
        )))
    }

    fn source_name(&self) -> &'static str {
        "failing"
    }
}

/// Credential source that succeeds with nothing
#[derive(Debug)]
#[allow(dead_code)]
pub struct NoCredentials;

#[async_trait]
impl CredentialSource for NoCredentials {
    async fn fetch(&self) -> Result<Option<Credentials>, CredentialError> {
        Ok(None)
    }

    fn source_name(&self) -> &'static str {
        "none"
    }
}

/// Transport that records requests and answers with a canned response
#[derive(Debug)]
#[allow(dead_code)]
pub struct RecordingInvoker {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<SignableRequest>>,
}

#[allow(dead_code)]
impl RecordingInvoker {
    /// Answer every request with `status` and `body`
    pub fn new(status: u16, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.into(),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<SignableRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl HttpInvoker for RecordingInvoker {
    async fn send(&self, request: SignableRequest) -> turbocanvas::Result<HttpResponse> {
        self.requests.lock().expect("lock poisoned").push(request);
        Ok(HttpResponse::new(
            self.status,
            HeaderMap::new(),
            self.body.clone(),
        ))
    }

    fn invoker_name(&self) -> &'static str {
        "recording"
    }
}
