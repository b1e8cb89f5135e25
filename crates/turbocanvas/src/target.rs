//! Invocation targets
//!
//! The two endpoints this client talks to differ only in data: the service
//! name in the credential scope, the canonicalization policy, the payload
//! shape and the IAM action a denial refers to. [`InvocationTarget`] carries
//! all of it so the client runs a single code path for both.

use std::fmt;

use turbocanvas_sigv4::CanonicalizationPolicy;
use url::Url;

use crate::error::{Error, Result};
use crate::region::AwsRegion;

/// Service name for API Gateway invocations.
pub const EXECUTE_API_SERVICE: &str = "execute-api";

/// Service name for direct Bedrock model invocations.
pub const BEDROCK_SERVICE: &str = "bedrock";

/// Which kind of endpoint a target addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// API Gateway in front of a Lambda that calls the model.
    Proxy,
    /// The Bedrock runtime `InvokeModel` endpoint.
    DirectModel,
}

impl TargetKind {
    /// Service name used in the credential scope.
    pub fn service(&self) -> &'static str {
        match self {
            TargetKind::Proxy => EXECUTE_API_SERVICE,
            TargetKind::DirectModel => BEDROCK_SERVICE,
        }
    }

    /// Canonicalization rules for this kind of endpoint.
    pub fn policy(&self) -> CanonicalizationPolicy {
        match self {
            TargetKind::Proxy => CanonicalizationPolicy::PROXY,
            TargetKind::DirectModel => CanonicalizationPolicy::DIRECT_MODEL,
        }
    }

    /// IAM action named in authorization failures for this endpoint.
    pub fn invoke_action(&self) -> &'static str {
        match self {
            TargetKind::Proxy => "execute-api:Invoke",
            TargetKind::DirectModel => "bedrock:InvokeModel",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Proxy => f.write_str("proxy"),
            TargetKind::DirectModel => f.write_str("direct-model"),
        }
    }
}

/// A fully validated endpoint to invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationTarget {
    /// Endpoint kind
    pub kind: TargetKind,
    /// Scheme and authority, without a trailing slash
    pub endpoint_base: String,
    /// Absolute request path
    pub path: String,
    /// Region used in the credential scope
    pub region: AwsRegion,
    /// Service name used in the credential scope
    pub service: &'static str,
    /// Canonicalization rules applied when signing
    pub policy: CanonicalizationPolicy,
    /// Model identifier, for direct-model targets
    pub model_id: Option<String>,
}

impl InvocationTarget {
    /// Target an API Gateway resource.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the endpoint or path is empty, still
    /// a placeholder, or does not form a valid URL.
    pub fn proxy(endpoint_base: &str, resource_path: &str, region: AwsRegion) -> Result<Self> {
        let endpoint_base = validate_endpoint(endpoint_base)?;
        let path = require_value("resource path", resource_path)?;
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self::new(TargetKind::Proxy, endpoint_base, path, region, None)
    }

    /// Target a Bedrock model through an explicit runtime endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the endpoint or model identifier is
    /// empty, still a placeholder, or does not form a valid URL.
    pub fn direct_model(endpoint_base: &str, model_id: &str, region: AwsRegion) -> Result<Self> {
        let endpoint_base = validate_endpoint(endpoint_base)?;
        let model_id = require_value("model id", model_id)?;
        let path = format!("/model/{model_id}/invoke");

        Self::new(
            TargetKind::DirectModel,
            endpoint_base,
            path,
            region,
            Some(model_id.to_string()),
        )
    }

    /// Target a Bedrock model through the default runtime endpoint of `region`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the model identifier is empty or a
    /// placeholder.
    pub fn direct_model_for_region(region: AwsRegion, model_id: &str) -> Result<Self> {
        Self::direct_model(&default_bedrock_endpoint(region), model_id, region)
    }

    fn new(
        kind: TargetKind,
        endpoint_base: String,
        path: String,
        region: AwsRegion,
        model_id: Option<String>,
    ) -> Result<Self> {
        let target = Self {
            kind,
            endpoint_base,
            path,
            region,
            service: kind.service(),
            policy: kind.policy(),
            model_id,
        };
        target.url()?;
        Ok(target)
    }

    /// Full request URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the endpoint and path do not parse
    /// as a URL.
    pub fn url(&self) -> Result<Url> {
        let raw = format!("{}{}", self.endpoint_base, self.path);
        Url::parse(&raw)
            .map_err(|e| Error::Configuration(format!("invalid endpoint URL '{raw}': {e}")))
    }

    /// IAM action named in authorization failures for this target.
    pub fn invoke_action(&self) -> &'static str {
        self.kind.invoke_action()
    }
}

/// Default Bedrock runtime endpoint for a region.
pub fn default_bedrock_endpoint(region: AwsRegion) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

/// True for values copied from a configuration template and never filled in.
pub fn is_placeholder(value: &str) -> bool {
    value.contains("YOUR_API_GATEWAY_INVOKE_URL") || value.contains("<YOUR_")
}

fn require_value<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Configuration(format!("{name} is not set")));
    }
    if is_placeholder(value) {
        return Err(Error::Configuration(format!(
            "{name} is still a placeholder: '{value}'"
        )));
    }
    Ok(value)
}

fn validate_endpoint(endpoint_base: &str) -> Result<String> {
    let endpoint_base = require_value("endpoint", endpoint_base)?;
    Url::parse(endpoint_base).map_err(|e| {
        Error::Configuration(format!("invalid endpoint URL '{endpoint_base}': {e}"))
    })?;
    Ok(endpoint_base.trim_end_matches('/').to_string())
}
