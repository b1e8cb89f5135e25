//! # TurboCanvas
//!
//! Image generation client for AWS-hosted models, supporting:
//! - API Gateway proxies backed by a Lambda (`execute-api`)
//! - Direct Bedrock model invocation (`bedrock`)
//! - SigV4 signing with temporary credentials
//! - Response envelopes from both paths, decoded to raw image bytes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use turbocanvas::{ClientConfig, ImageClient, ImageGenerationRequest, StaticCredentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ImageClient::builder()
//!         .config(ClientConfig::direct_model("stability.stable-diffusion-xl-v1:0"))
//!         .credentials(StaticCredentials::from_keys("AKID...", "secret", None))
//!         .build()?;
//!
//!     let image = client
//!         .generate(&ImageGenerationRequest::new("a lighthouse at dusk").with_seed(7))
//!         .await?;
//!
//!     println!("received {} bytes", image.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::{ImageClient, ImageClientBuilder};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use error::{CredentialError, Error, ErrorKind, PermissionDenied, Remediation, Result};
pub use region::{AwsRegion, resolve_region};
pub use request::{ImageGenerationRequest, RequestPayload, build_payload};
pub use response::{Envelope, GeneratedImage, unwrap_response};
pub use target::{InvocationTarget, TargetKind};

// Signing primitives
pub use turbocanvas_sigv4::{CanonicalizationPolicy, Credentials, Signature, SignableRequest};

// Module declarations
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod observability;
pub mod prompt;
pub mod region;
pub mod request;
pub mod response;
pub mod target;

// Re-export key dependencies for convenience
pub use async_trait::async_trait;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use turbocanvas::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ClientConfig, CredentialSource, Credentials, Error, ErrorKind, GeneratedImage,
        ImageClient, ImageGenerationRequest, InvocationTarget, Result, StaticCredentials,
        TargetKind,
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
