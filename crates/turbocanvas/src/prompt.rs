//! Prompt enhancement for direct model invocation
//!
//! The proxy backend expands prompts with a style description and a quality
//! suffix before calling the model. Direct invocations have no backend, so
//! the client can apply the same expansion locally when
//! [`ClientConfig::enhance_prompts`](crate::ClientConfig::enhance_prompts) is set.

/// Suffix appended to every enhanced prompt.
pub const QUALITY_SUFFIX: &str = "high quality, 4K, detailed, professional";

/// Description for a known style preset, matched case-insensitively.
pub fn style_description(style_preset: &str) -> Option<&'static str> {
    let description = match style_preset.to_lowercase().as_str() {
        "line art" => {
            "in line art style, clean linework, high contrast black and white illustration, minimalist"
        }
        "digital art" => "digital art style, vibrant colors, detailed, professional digital painting",
        "photorealistic" => {
            "photorealistic style, highly detailed, sharp focus, professional photography"
        }
        "anime" => "anime style, vibrant colors, clean lines, detailed characters and backgrounds",
        "watercolor" => "watercolor painting style, soft colors, gentle brush strokes, artistic",
        "oil painting" => {
            "oil painting style, textured brush strokes, rich colors, classic art technique"
        }
        "3d rendering" => {
            "3D rendering, detailed textures, volumetric lighting, professional 3D visualization"
        }
        "cartoon" => "cartoon style, bold outlines, bright colors, simplified shapes",
        _ => return None,
    };
    Some(description)
}

/// Expand `prompt` with the style description and quality suffix.
///
/// Unknown presets become `in {preset} style`. An empty preset adds only
/// the quality suffix.
///
/// ```rust
/// use turbocanvas::prompt::enhance_prompt;
///
/// assert_eq!(
///     enhance_prompt(" a fox ", Some("pixel art")),
///     "a fox, in pixel art style, high quality, 4K, detailed, professional"
/// );
/// ```
pub fn enhance_prompt(prompt: &str, style_preset: Option<&str>) -> String {
    let base = prompt.trim();
    let style = style_preset.map(str::trim).filter(|s| !s.is_empty()).map(|preset| {
        style_description(preset)
            .map(str::to_string)
            .unwrap_or_else(|| format!("in {preset} style"))
    });

    match style {
        Some(style) => format!("{base}, {style}, {QUALITY_SUFFIX}"),
        None => format!("{base}, {QUALITY_SUFFIX}"),
    }
}
