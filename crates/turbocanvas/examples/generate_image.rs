//! Generate one image and write it to disk
//!
//! ## Prerequisites
//!
//! 1. AWS credentials in the environment:
//!    `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, optionally `AWS_SESSION_TOKEN`
//!
//! 2. Target configuration (or a `.env` file with the same keys):
//!    - Proxy: `TURBOCANVAS_ENDPOINT`, `TURBOCANVAS_RESOURCE_PATH`, `TURBOCANVAS_REGION`
//!    - Direct: `TURBOCANVAS_TARGET=direct-model`, `TURBOCANVAS_MODEL_ID`,
//!      `TURBOCANVAS_BEDROCK_REGION`
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=turbocanvas=debug cargo run --example generate_image -- "a red fox in snow" out.png
//! ```

use std::sync::Arc;
use turbocanvas::{ClientConfig, EnvCredentials, ImageClient, ImageGenerationRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let prompt = args.next().unwrap_or_else(|| "a lighthouse at dusk".to_string());
    let output = args.next().unwrap_or_else(|| "generated.png".to_string());

    let config = ClientConfig::from_dotenv()?;
    let client = ImageClient::from_config(config, Arc::new(EnvCredentials::new()))?;
    println!("Invoking {} target at {}", client.target().kind, client.target().endpoint_base);

    match client.generate(&ImageGenerationRequest::new(prompt)).await {
        Ok(image) => {
            std::fs::write(&output, image.bytes())?;
            println!("Wrote {} bytes to {output}", image.len());
        }
        Err(err) => {
            if let Some(denied) = err.permission_denied() {
                eprintln!("Permission denied for {}", denied.action);
                for (i, step) in denied.remediation.iter().enumerate() {
                    eprintln!("  {}. {step}", i + 1);
                }
            }
            return Err(err.into());
        }
    }

    Ok(())
}
