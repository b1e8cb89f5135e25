//! Sending signed requests

use async_trait::async_trait;
use std::fmt;
use turbocanvas_sigv4::SignableRequest;

use super::HttpResponse;
use crate::error::{Error, Result};
use crate::observability::{RequestMetadata, RequestTimer};

/// Transport for signed requests.
///
/// The request arrives fully signed; implementations must send its method,
/// URL, headers and body unchanged, once. Any non-2xx status is returned as
/// a normal [`HttpResponse`]; only transport failures are errors.
#[async_trait]
pub trait HttpInvoker: Send + Sync + fmt::Debug {
    /// Send the request and buffer the whole response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] when no response status was received.
    async fn send(&self, request: SignableRequest) -> Result<HttpResponse>;

    /// Name used in logs.
    fn invoker_name(&self) -> &'static str;
}

/// Default transport backed by `reqwest`.
///
/// No timeout is configured beyond the client's own defaults.
#[derive(Debug, Clone, Default)]
pub struct ReqwestInvoker {
    client: reqwest::Client,
}

impl ReqwestInvoker {
    /// Create an invoker with a default `reqwest` client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder.
    pub fn builder() -> ReqwestInvokerBuilder {
        ReqwestInvokerBuilder::default()
    }

    /// Use an existing `reqwest` client (shared connection pool, proxy settings).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpInvoker for ReqwestInvoker {
    async fn send(&self, request: SignableRequest) -> Result<HttpResponse> {
        let metadata = RequestMetadata::from_signable(&request);
        metadata.log_request();

        let timer = RequestTimer::start();
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(Error::network)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Error::network)?;

        Ok(HttpResponse::new(status, headers, body).with_elapsed(timer.elapsed()))
    }

    fn invoker_name(&self) -> &'static str {
        "reqwest"
    }
}

/// Builder for [`ReqwestInvoker`].
#[derive(Debug, Default)]
pub struct ReqwestInvokerBuilder {
    user_agent: Option<String>,
    proxy: Option<String>,
}

impl ReqwestInvokerBuilder {
    /// Set the `User-Agent` header. It is not part of the signature.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Route requests through an HTTP proxy.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build the invoker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the proxy URL is invalid or the
    /// TLS backend cannot be initialized.
    pub fn build(self) -> Result<ReqwestInvoker> {
        let mut builder = reqwest::Client::builder().user_agent(
            self.user_agent
                .unwrap_or_else(|| format!("turbocanvas/{}", crate::VERSION)),
        );

        if let Some(proxy) = self.proxy {
            let proxy = reqwest::Proxy::all(&proxy)
                .map_err(|e| Error::Configuration(format!("invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(ReqwestInvoker { client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_passes_request_through_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/dev/generateImage"))
            .and(header("x-amz-date", "20240102T030405Z"))
            .and(body_string(r#"{"prompt":"cat"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/dev/generateImage", server.uri()).parse().unwrap();
        let mut request = SignableRequest::post(url, br#"{"prompt":"cat"}"#.to_vec());
        request.set_header("x-amz-date", "20240102T030405Z").unwrap();

        let response = ReqwestInvoker::new().send(request).await.unwrap();
        assert!(response.is_success());
        assert_eq!(response.text(), "ok");
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let url = server.uri().parse().unwrap();
        let response = ReqwestInvoker::new()
            .send(SignableRequest::post(url, Vec::new()))
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 500);
        assert_eq!(response.text(), "boom");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let url = format!("http://127.0.0.1:{port}/").parse().unwrap();
        let err = ReqwestInvoker::new()
            .send(SignableRequest::post(url, Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)), "got {err:?}");
    }

    #[test]
    fn test_builder_rejects_bad_proxy() {
        let err = ReqwestInvoker::builder().proxy("::not a proxy::").build();
        assert!(matches!(err, Err(Error::Configuration(_))));
    }
}
