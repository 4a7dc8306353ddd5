#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # imgtools
//!
//! Image utilities behind a small HTTP API: assembling images into a PDF,
//! cropping, and replacing a photo's background through a remote
//! background-removal service.
//!
//! ## Features
//!
//! - **Image to PDF**: one full-bleed page per image, 1 pixel = 1 point
//! - **Background replacement**: remove the background remotely, then
//!   composite the subject over a solid colour or a cover-fitted image
//! - **Cropping**: cut a pixel rectangle out of an upload
//! - **Upload hygiene**: uploads are staged per request and always removed
//! - **Server binary**: `imgtools-server` (enable with the `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imgtools::{images_to_pdf, UploadedImage};
//!
//! # fn example() -> anyhow::Result<()> {
//! let pages = vec![
//!     UploadedImage::new(std::fs::read("first.png")?),
//!     UploadedImage::new(std::fs::read("second.jpg")?),
//! ];
//! let pdf = images_to_pdf(&pages)?;
//! std::fs::write("converted.pdf", pdf)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Background replacement
//!
//! ```rust,no_run
//! use imgtools::{
//!     replace_background_from_reader, BackgroundSpec, RemoveBgClient, ServerConfig,
//!     utils::ColorParser,
//! };
//! use std::sync::Arc;
//! use tokio::fs::File;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::builder().api_key("your-key").build()?;
//! let client = Arc::new(RemoveBgClient::new(config.remove_bg)?);
//! let white = BackgroundSpec::Color(ColorParser::parse("#ffffff")?);
//!
//! let png = replace_background_from_reader(File::open("portrait.jpg").await?, client, &white).await?;
//! tokio::fs::write("background-edited.png", png).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): server binary, tracing subscriber and flag parsing
//! - `webp-support` (default): WebP decoding
//! - `tracing-json`: JSON log output for the server

#[cfg(feature = "cli")]
pub mod cli;
pub mod compositor;
pub mod config;
pub mod cropper;
pub mod error;
pub mod pdf;
pub mod processor;
pub mod removal;
pub mod server;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;
pub mod uploads;
pub mod utils;

use std::sync::Arc;
use tokio::io::AsyncRead;

// Public API exports
pub use compositor::{
    compose, compose_bytes, compose_over_color, compose_over_image, cover_fit, source_over,
};
pub use config::{RemoveBgConfig, ServerConfig, ServerConfigBuilder};
pub use cropper::crop;
pub use error::{ErrorKind, ImgToolsError, Result};
pub use pdf::PdfAssembler;
pub use processor::BackgroundEditor;
pub use removal::{BackgroundRemover, MockBehavior, MockRemover, RemoveBgClient};
pub use server::{app, serve, AppState};
pub use services::ImageIOService;
pub use types::{
    BackgroundColor, BackgroundSpec, CompositeResult, CropRegion, ImageRole, UploadedImage,
};
pub use uploads::{StagedFile, UploadStaging};

#[cfg(feature = "cli")]
pub use tracing_config::{TracingConfig, TracingFormat};

/// Assemble images into a PDF with the default compression level
///
/// Pages appear in input order, each sized to its image.
pub fn images_to_pdf(images: &[UploadedImage]) -> Result<Vec<u8>> {
    PdfAssembler::default().assemble(images)
}

/// Replace the background of an image read from an async stream
///
/// Reads the stream to the end, then runs the same flow as the HTTP endpoint:
/// one call to `remover`, compositing over `background`, PNG output.
pub async fn replace_background_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    remover: Arc<dyn BackgroundRemover>,
    background: &BackgroundSpec,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer)
        .await
        .map_err(|e| ImgToolsError::invalid_input(format!("Failed to read from stream: {}", e)))?;

    BackgroundEditor::new(remover)
        .edit(&buffer, background)
        .await
}
