//! Image generation requests and their wire payloads
//!
//! One [`ImageGenerationRequest`] maps to two different JSON shapes:
//! a flat camelCase object for the proxy endpoint and a `text_prompts`
//! object for direct model invocation. [`build_payload`] is a pure function
//! of the request and the target kind.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::target::TargetKind;

/// Default number of images to generate.
pub const DEFAULT_NUMBER_OF_IMAGES: u32 = 1;
/// Default image width in pixels.
pub const DEFAULT_WIDTH: u32 = 1024;
/// Default image height in pixels.
pub const DEFAULT_HEIGHT: u32 = 1024;
/// Default classifier-free guidance scale.
pub const DEFAULT_CFG_SCALE: f64 = 7.0;
/// Default seed.
pub const DEFAULT_SEED: u32 = 0;
/// Default number of diffusion steps.
pub const DEFAULT_STEPS: u32 = 50;

/// Parameters for a single image generation call.
///
/// # Example
///
/// ```rust
/// use turbocanvas::ImageGenerationRequest;
///
/// let request = ImageGenerationRequest::new("a lighthouse at dusk")
///     .with_style_preset("watercolor")
///     .with_size(768, 512)
///     .with_seed(42);
/// assert_eq!(request.width, 768);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    /// Text prompt
    pub prompt: String,
    /// Optional style preset; empty means none
    pub style_preset: Option<String>,
    /// Number of images to generate
    pub number_of_images: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Guidance scale
    pub cfg_scale: f64,
    /// Seed
    pub seed: u32,
    /// Diffusion steps
    pub steps: u32,
}

impl ImageGenerationRequest {
    /// Create a request with default parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style_preset: None,
            number_of_images: DEFAULT_NUMBER_OF_IMAGES,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cfg_scale: DEFAULT_CFG_SCALE,
            seed: DEFAULT_SEED,
            steps: DEFAULT_STEPS,
        }
    }

    /// Set the style preset.
    pub fn with_style_preset(mut self, style_preset: impl Into<String>) -> Self {
        self.style_preset = Some(style_preset.into());
        self
    }

    /// Set the number of images.
    pub fn with_number_of_images(mut self, number_of_images: u32) -> Self {
        self.number_of_images = number_of_images;
        self
    }

    /// Set width and height.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the guidance scale.
    pub fn with_cfg_scale(mut self, cfg_scale: f64) -> Self {
        self.cfg_scale = cfg_scale;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of diffusion steps.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    /// The style preset exactly as given, if set and non-empty.
    pub fn style(&self) -> Option<&str> {
        self.style_preset.as_deref().filter(|s| !s.is_empty())
    }

    /// Check the request before anything is signed or sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] for an empty prompt, a zero count,
    /// dimension or step value, or a non-finite cfg scale.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::InvalidRequest("prompt must not be empty".into()));
        }
        if self.number_of_images == 0 {
            return Err(Error::InvalidRequest(
                "number_of_images must be at least 1".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidRequest(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.steps == 0 {
            return Err(Error::InvalidRequest("steps must be at least 1".into()));
        }
        if !self.cfg_scale.is_finite() {
            return Err(Error::InvalidRequest("cfg_scale must be finite".into()));
        }
        Ok(())
    }
}

/// Proxy payload: fields map one to one by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyPayload {
    /// Text prompt
    pub prompt: String,
    /// Number of images
    pub number_of_images: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Guidance scale
    pub cfg_scale: f64,
    /// Seed
    pub seed: u32,
    /// Diffusion steps
    pub steps: u32,
    /// Style preset, omitted when empty
    #[serde(rename = "style_preset", skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<String>,
}

/// One weighted text prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPrompt {
    /// Prompt text
    pub text: String,
    /// Prompt weight
    pub weight: f64,
}

/// Direct model payload: `text_prompts` plus snake_case scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectModelPayload {
    /// Weighted prompts; always exactly one
    pub text_prompts: Vec<TextPrompt>,
    /// Guidance scale
    pub cfg_scale: f64,
    /// Seed
    pub seed: u32,
    /// Diffusion steps
    pub steps: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Style preset, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_preset: Option<String>,
}

/// The JSON body sent to a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    /// Body for [`TargetKind::Proxy`]
    Proxy(ProxyPayload),
    /// Body for [`TargetKind::DirectModel`]
    DirectModel(DirectModelPayload),
}

impl RequestPayload {
    /// Serialize to the exact bytes that are signed and sent.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Map a request onto the payload shape of `kind`.
pub fn build_payload(request: &ImageGenerationRequest, kind: TargetKind) -> RequestPayload {
    let style_preset = request.style().map(str::to_string);
    match kind {
        TargetKind::Proxy => RequestPayload::Proxy(ProxyPayload {
            prompt: request.prompt.clone(),
            number_of_images: request.number_of_images,
            width: request.width,
            height: request.height,
            cfg_scale: request.cfg_scale,
            seed: request.seed,
            steps: request.steps,
            style_preset,
        }),
        TargetKind::DirectModel => RequestPayload::DirectModel(DirectModelPayload {
            text_prompts: vec![TextPrompt {
                text: request.prompt.clone(),
                weight: 1.0,
            }],
            cfg_scale: request.cfg_scale,
            seed: request.seed,
            steps: request.steps,
            width: request.width,
            height: request.height,
            style_preset,
        }),
    }
}
