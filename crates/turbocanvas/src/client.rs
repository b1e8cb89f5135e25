//! Image generation client

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use turbocanvas_sigv4::{Signature, SignableRequest, SigningParams, sign};

use crate::{
    config::ClientConfig,
    credentials::{CredentialSource, resolve_credentials},
    error::{Error, Result},
    http::{HttpInvoker, ReqwestInvoker, check_status},
    observability::{RequestTimer, ResponseMetadata, log_transport_error},
    prompt::enhance_prompt,
    request::{ImageGenerationRequest, build_payload},
    response::{GeneratedImage, unwrap_response},
    target::{InvocationTarget, TargetKind},
};

/// Source of signing timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Client that signs and sends image generation requests.
///
/// Cloning is cheap and clones share the credential source and transport.
/// Nothing else is shared between calls: every call fetches credentials,
/// builds its payload and signs a fresh request.
///
/// # Example
///
/// ```rust,no_run
/// use turbocanvas::{ClientConfig, EnvCredentials, ImageClient, ImageGenerationRequest};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::proxy(
///     "https://abc123.execute-api.ap-northeast-1.amazonaws.com",
///     "/dev/generateImage",
/// );
/// let client = ImageClient::from_config(config, Arc::new(EnvCredentials::new()))?;
///
/// let image = client
///     .generate(&ImageGenerationRequest::new("a red fox in snow"))
///     .await?;
/// std::fs::write("fox.png", image.bytes())?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ImageClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    target: InvocationTarget,
    credentials: Arc<dyn CredentialSource>,
    invoker: Arc<dyn HttpInvoker>,
    enhance_prompts: bool,
    clock: Clock,
}

impl ImageClient {
    /// Create a new client builder.
    pub fn builder() -> ImageClientBuilder {
        ImageClientBuilder::default()
    }

    /// Create a client from configuration and a credential source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the configuration does not resolve
    /// to a valid invocation target.
    pub fn from_config(config: ClientConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self> {
        Self::builder()
            .config(config)
            .credential_source(credentials)
            .build()
    }

    /// The resolved invocation target.
    pub fn target(&self) -> &InvocationTarget {
        &self.inner.target
    }

    /// Whether prompts are expanded before direct model invocation.
    pub fn enhances_prompts(&self) -> bool {
        self.inner.enhance_prompts
    }

    /// Build and sign the request for `request` without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`], [`Error::Credentials`] or
    /// [`Error::Signing`]; nothing is sent in any case.
    pub async fn prepare(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<(SignableRequest, Signature)> {
        request.validate()?;
        let target = &self.inner.target;

        let body = match (target.kind, self.inner.enhance_prompts) {
            (TargetKind::DirectModel, true) => {
                let mut enhanced = request.clone();
                enhanced.prompt = enhance_prompt(&request.prompt, request.style());
                build_payload(&enhanced, target.kind)
            }
            _ => build_payload(request, target.kind),
        }
        .to_bytes()?;

        let credentials = resolve_credentials(self.inner.credentials.as_ref()).await?;

        let mut signable = SignableRequest::post(target.url()?, body);
        signable.set_header("content-type", "application/json")?;
        signable.set_header("accept", "application/json")?;

        let params = SigningParams {
            region: target.region.as_str(),
            service: target.service,
            timestamp: (self.inner.clock)(),
            policy: target.policy,
        };
        let signature = sign(&mut signable, &credentials, &params)?;
        debug!(
            target_kind = %target.kind,
            credential_scope = signature.credential_scope(),
            "Request signed"
        );

        Ok((signable, signature))
    }

    /// Generate an image.
    ///
    /// One attempt is made; the returned future resolves to exactly one
    /// outcome and is not retried on failure.
    ///
    /// # Errors
    ///
    /// Any [`Error`] variant; see [`Error::kind`] for classification.
    pub async fn generate(&self, request: &ImageGenerationRequest) -> Result<GeneratedImage> {
        let (signable, _) = self.prepare(request).await?;
        let target = &self.inner.target;

        let kind = target.kind.to_string();

        let timer = RequestTimer::start();
        let response = match self.inner.invoker.send(signable).await {
            Ok(response) => response,
            Err(e) => {
                log_transport_error(
                    &kind,
                    &target.path,
                    self.inner.invoker.invoker_name(),
                    timer.elapsed(),
                    &e.to_string(),
                );
                return Err(e);
            }
        };
        let metadata = ResponseMetadata::new(
            response.status().as_u16(),
            response.body().len(),
            response.elapsed(),
        );

        let outcome = check_status(target, response)
            .and_then(|response| unwrap_response(response.status().as_u16(), response.body()));
        match &outcome {
            Ok(image) => metadata.log_success(&kind, &target.path, image.len()),
            Err(e) => metadata.log_error(&kind, &target.path, &e.to_string()),
        }
        outcome
    }
}

impl fmt::Debug for ImageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageClient")
            .field("target", &self.inner.target)
            .field("credentials", &self.inner.credentials)
            .field("invoker", &self.inner.invoker)
            .field("enhance_prompts", &self.inner.enhance_prompts)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a configured [`ImageClient`].
#[derive(Default)]
pub struct ImageClientBuilder {
    config: ClientConfig,
    target: Option<InvocationTarget>,
    credentials: Option<Arc<dyn CredentialSource>>,
    invoker: Option<Arc<dyn HttpInvoker>>,
    clock: Option<Clock>,
}

impl ImageClientBuilder {
    /// Use `config` for the target and prompt settings.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an already resolved target, ignoring the target fields of the config.
    pub fn target(mut self, target: InvocationTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the credential source.
    pub fn credentials(self, credentials: impl CredentialSource + 'static) -> Self {
        self.credential_source(Arc::new(credentials))
    }

    /// Set a shared credential source.
    pub fn credential_source(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Replace the default `reqwest` transport.
    pub fn invoker(mut self, invoker: Arc<dyn HttpInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Enable or disable local prompt enhancement.
    pub fn enhance_prompts(mut self, enabled: bool) -> Self {
        self.config.enhance_prompts = enabled;
        self
    }

    /// Override the signing clock.
    pub fn clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no credential source was given or
    /// the target cannot be resolved.
    pub fn build(self) -> Result<ImageClient> {
        let credentials = self
            .credentials
            .ok_or_else(|| Error::Configuration("credential source is not set".to_string()))?;
        let target = match self.target {
            Some(target) => target,
            None => self.config.invocation_target()?,
        };
        let invoker = self
            .invoker
            .unwrap_or_else(|| Arc::new(ReqwestInvoker::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(Utc::now));

        debug!(
            target_kind = %target.kind,
            region = %target.region,
            invoker = invoker.invoker_name(),
            credentials = credentials.source_name(),
            "Image client created"
        );

        Ok(ImageClient {
            inner: Arc::new(ClientInner {
                target,
                credentials,
                invoker,
                enhance_prompts: self.config.enhance_prompts,
                clock,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;
    use crate::region::AwsRegion;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    fn direct_client(enhance: bool) -> ImageClient {
        ImageClient::builder()
            .target(
                InvocationTarget::direct_model_for_region(
                    AwsRegion::UsEast1,
                    "stability.stable-diffusion-xl-v1:0",
                )
                .unwrap(),
            )
            .credentials(StaticCredentials::from_keys(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
                None,
            ))
            .enhance_prompts(enhance)
            .clock(fixed_clock)
            .build()
            .unwrap()
    }

    #[derive(Debug)]
    struct UnreachableInvoker;

    #[async_trait::async_trait]
    impl HttpInvoker for UnreachableInvoker {
        async fn send(&self, _request: SignableRequest) -> Result<crate::http::HttpResponse> {
            Err(Error::network(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "tunnel refused connection",
            )))
        }

        fn invoker_name(&self) -> &'static str {
            "unreachable"
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_logged_and_returned() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = ImageClient::builder()
            .target(
                InvocationTarget::direct_model_for_region(AwsRegion::UsEast1, "m").unwrap(),
            )
            .credentials(StaticCredentials::from_keys("AKIDEXAMPLE", "secret", None))
            .invoker(Arc::new(UnreachableInvoker))
            .clock(fixed_clock)
            .build()
            .unwrap();

        let err = client
            .generate(&ImageGenerationRequest::new("cat"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Network);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("before a response was received"), "{output}");
        assert!(output.contains("invoker=\"unreachable\""), "{output}");
        assert!(output.contains("tunnel refused connection"), "{output}");
    }

    #[test]
    fn test_builder_requires_credentials() {
        let err = ImageClient::builder()
            .config(ClientConfig::direct_model("m"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("credential")));
    }

    #[test]
    fn test_builder_rejects_placeholder_config() {
        let err = ImageClient::builder()
            .config(ClientConfig::proxy(
                "<YOUR_API_GATEWAY_INVOKE_URL>",
                "/dev/generateImage",
            ))
            .credentials(StaticCredentials::from_keys("a", "b", None))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[tokio::test]
    async fn test_prepare_matches_reference_signature() {
        let client = direct_client(false);
        let (request, signature) = client
            .prepare(&ImageGenerationRequest::new("cat"))
            .await
            .unwrap();

        assert_eq!(request.header("host"), Some("bedrock-runtime.us-east-1.amazonaws.com"));
        assert_eq!(request.header("x-amz-date"), Some("20240102T030405Z"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(signature.signed_headers(), "content-type;host;x-amz-date");
        assert_eq!(
            signature.credential_scope(),
            "20240102/us-east-1/bedrock/aws4_request"
        );
        assert!(
            signature
                .canonical_request()
                .contains("/model/stability.stable-diffusion-xl-v1%3A0/invoke")
        );
    }

    #[tokio::test]
    async fn test_prepare_enhances_direct_prompt() {
        let request = ImageGenerationRequest::new("cat").with_style_preset("anime");

        let (plain, _) = direct_client(false).prepare(&request).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&plain.body).unwrap();
        assert_eq!(value["text_prompts"][0]["text"], "cat");

        let (enhanced, _) = direct_client(true).prepare(&request).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&enhanced.body).unwrap();
        assert_eq!(
            value["text_prompts"][0]["text"],
            enhance_prompt("cat", Some("anime"))
        );
        assert_eq!(value["style_preset"], "anime");
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_credentials() {
        let err = direct_client(false)
            .prepare(&ImageGenerationRequest::new(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_client_clone_shares_inner() {
        let client = direct_client(false);
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.inner, &clone.inner));
        assert!(format!("{client:?}").contains("ImageClient"));
    }
}
