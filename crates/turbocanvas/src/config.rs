//! Configuration for the image client

use crate::error::{Error, Result};
use crate::region::{AwsRegion, DEFAULT_REGION, resolve_region};
use crate::target::{InvocationTarget, TargetKind};

/// Configuration for [`ImageClient`](crate::ImageClient).
///
/// Values are opaque strings as loaded from the outside; they are validated
/// when the invocation target is resolved, not when they are set.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Which endpoint kind to invoke
    pub target: TargetKind,

    /// Endpoint base URL. Required for the proxy target; the direct target
    /// defaults to the Bedrock runtime endpoint of its region.
    pub endpoint: Option<String>,

    /// API Gateway resource path (proxy target)
    pub resource_path: Option<String>,

    /// Model identifier (direct target)
    pub model_id: Option<String>,

    /// Region for proxy signing, and for direct signing when
    /// `bedrock_region` is unset
    pub region: String,

    /// Region for direct model invocation
    pub bedrock_region: Option<String>,

    /// Expand prompts locally before direct model invocation
    pub enhance_prompts: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: TargetKind::Proxy,
            endpoint: None,
            resource_path: None,
            model_id: None,
            region: DEFAULT_REGION.as_str().to_string(),
            bedrock_region: None,
            enhance_prompts: false,
        }
    }
}

impl ClientConfig {
    /// Configuration for an API Gateway proxy.
    pub fn proxy(endpoint: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self {
            target: TargetKind::Proxy,
            endpoint: Some(endpoint.into()),
            resource_path: Some(resource_path.into()),
            ..Default::default()
        }
    }

    /// Configuration for direct model invocation.
    pub fn direct_model(model_id: impl Into<String>) -> Self {
        Self {
            target: TargetKind::DirectModel,
            model_id: Some(model_id.into()),
            ..Default::default()
        }
    }

    /// Create a builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from environment variables.
    ///
    /// This will look for:
    /// - `TURBOCANVAS_TARGET` (`proxy` or `direct-model`)
    /// - `TURBOCANVAS_ENDPOINT` for the endpoint base URL
    /// - `TURBOCANVAS_RESOURCE_PATH` for the proxy resource path
    /// - `TURBOCANVAS_MODEL_ID` for the model identifier
    /// - `TURBOCANVAS_REGION` for the signing region
    /// - `TURBOCANVAS_BEDROCK_REGION` for the direct invocation region
    /// - `TURBOCANVAS_ENHANCE_PROMPTS` (`true`/`false`, `1`/`0`, `yes`/`no`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an unknown target or an
    /// unparsable boolean.
    #[cfg(feature = "env")]
    #[cfg_attr(docsrs, doc(cfg(feature = "env")))]
    pub fn from_env() -> Result<Self> {
        use std::env;

        let mut config = Self::default();

        if let Ok(target) = env::var("TURBOCANVAS_TARGET") {
            config.target = parse_target(&target)?;
        }

        if let Ok(endpoint) = env::var("TURBOCANVAS_ENDPOINT") {
            config.endpoint = Some(endpoint);
        }

        if let Ok(resource_path) = env::var("TURBOCANVAS_RESOURCE_PATH") {
            config.resource_path = Some(resource_path);
        }

        if let Ok(model_id) = env::var("TURBOCANVAS_MODEL_ID") {
            config.model_id = Some(model_id);
        }

        if let Ok(region) = env::var("TURBOCANVAS_REGION")
            && !region.trim().is_empty()
        {
            config.region = region;
        }

        if let Ok(bedrock_region) = env::var("TURBOCANVAS_BEDROCK_REGION") {
            config.bedrock_region = Some(bedrock_region);
        }

        if let Ok(enhance) = env::var("TURBOCANVAS_ENHANCE_PROMPTS") {
            config.enhance_prompts = parse_bool("TURBOCANVAS_ENHANCE_PROMPTS", &enhance)?;
        }

        Ok(config)
    }

    /// Load a `.env` file from the working directory, if any, then call
    /// [`from_env`](Self::from_env).
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the file exists but cannot be read or
    /// parsed, otherwise the same as [`from_env`](Self::from_env).
    #[cfg(feature = "env")]
    #[cfg_attr(docsrs, doc(cfg(feature = "env")))]
    pub fn from_dotenv() -> Result<Self> {
        load_dotenv(dotenvy::dotenv())?;
        Self::from_env()
    }

    /// Like [`from_dotenv`](Self::from_dotenv), reading the given file
    /// instead of `.env` in the working directory.
    ///
    /// # Errors
    ///
    /// Same as [`from_dotenv`](Self::from_dotenv).
    #[cfg(feature = "env")]
    #[cfg_attr(docsrs, doc(cfg(feature = "env")))]
    pub fn from_dotenv_path(path: impl AsRef<std::path::Path>) -> Result<Self> {
        load_dotenv(dotenvy::from_path(path.as_ref()).map(|()| path.as_ref().to_path_buf()))?;
        Self::from_env()
    }

    /// Region used to sign for the configured target.
    ///
    /// Unknown region strings resolve to the fallback region.
    pub fn signing_region(&self) -> AwsRegion {
        match self.target {
            TargetKind::Proxy => resolve_region(&self.region),
            TargetKind::DirectModel => {
                resolve_region(self.bedrock_region.as_deref().unwrap_or(&self.region))
            }
        }
    }

    /// Resolve and validate the invocation target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when a required value is missing, a
    /// placeholder, or not a valid URL.
    pub fn invocation_target(&self) -> Result<InvocationTarget> {
        let region = self.signing_region();
        match self.target {
            TargetKind::Proxy => {
                let endpoint = self.endpoint.as_deref().ok_or_else(|| missing("endpoint"))?;
                let path = self
                    .resource_path
                    .as_deref()
                    .ok_or_else(|| missing("resource path"))?;
                InvocationTarget::proxy(endpoint, path, region)
            }
            TargetKind::DirectModel => {
                let model_id = self.model_id.as_deref().ok_or_else(|| missing("model id"))?;
                match self.endpoint.as_deref() {
                    Some(endpoint) => InvocationTarget::direct_model(endpoint, model_id, region),
                    None => InvocationTarget::direct_model_for_region(region, model_id),
                }
            }
        }
    }
}

fn missing(name: &str) -> Error {
    Error::Configuration(format!("{name} is not set"))
}

/// A missing file is not an error; anything else the loader reports is.
#[cfg(feature = "env")]
fn load_dotenv(loaded: dotenvy::Result<std::path::PathBuf>) -> Result<()> {
    match loaded {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded dotenv file");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(Error::Configuration(format!("invalid dotenv file: {e}"))),
    }
}

#[cfg(feature = "env")]
fn parse_target(value: &str) -> Result<TargetKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "proxy" | "api-gateway" => Ok(TargetKind::Proxy),
        "direct" | "direct-model" | "bedrock" => Ok(TargetKind::DirectModel),
        other => Err(Error::Configuration(format!(
            "unknown target '{other}', expected 'proxy' or 'direct-model'"
        ))),
    }
}

#[cfg(feature = "env")]
fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(Error::Configuration(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target kind.
    pub fn target(mut self, target: TargetKind) -> Self {
        self.config.target = target;
        self
    }

    /// Set the endpoint base URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    /// Set the proxy resource path.
    pub fn resource_path(mut self, resource_path: impl Into<String>) -> Self {
        self.config.resource_path = Some(resource_path.into());
        self
    }

    /// Set the model identifier.
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.config.model_id = Some(model_id.into());
        self
    }

    /// Set the signing region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    /// Set the direct invocation region.
    pub fn bedrock_region(mut self, region: impl Into<String>) -> Self {
        self.config.bedrock_region = Some(region.into());
        self
    }

    /// Enable or disable local prompt enhancement.
    pub fn enhance_prompts(mut self, enabled: bool) -> Self {
        self.config.enhance_prompts = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
