//! Background replacement flow
//!
//! One server-authoritative path: decode the photo and the requested
//! background, call the remover once, composite the returned subject over the
//! background, encode PNG. Both uploads are decoded before the remote call so
//! bad input never costs an API request.

use crate::{
    compositor,
    error::{ImgToolsError, Result},
    removal::BackgroundRemover,
    services::ImageIOService,
    types::{BackgroundColor, BackgroundSpec, ImageRole},
};
use image::DynamicImage;
use std::sync::Arc;
use std::time::Instant;

/// Background decoded once, ahead of the remote call
enum PreparedBackground {
    Color(BackgroundColor),
    Image(DynamicImage),
}

/// Runs background removal followed by compositing
#[derive(Clone)]
pub struct BackgroundEditor {
    remover: Arc<dyn BackgroundRemover>,
}

impl std::fmt::Debug for BackgroundEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundEditor")
            .field("remover", &self.remover.name())
            .finish()
    }
}

impl BackgroundEditor {
    pub fn new(remover: Arc<dyn BackgroundRemover>) -> Self {
        Self { remover }
    }

    /// Replace the background of `image` and return PNG bytes
    ///
    /// The output has the dimensions of the foreground the remover returns.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty upload
    /// - `InvalidForegroundImage` if the photo does not decode, or the remover
    ///   returns undecodable bytes
    /// - `InvalidBackgroundImage` if an image background does not decode
    /// - `NoForegroundDetected` / `ServiceUnavailable` from the remover
    pub async fn edit(&self, image: &[u8], background: &BackgroundSpec) -> Result<Vec<u8>> {
        let started = Instant::now();

        if image.is_empty() {
            return Err(ImgToolsError::invalid_input("Image file is empty"));
        }
        let prepared = Self::prepare(image.to_vec(), background.clone()).await?;

        let foreground = self.remover.remove_background(image).await?;

        let png = blocking(move || {
            let fg = ImageIOService::load_from_bytes(&foreground, ImageRole::Foreground)?;
            let composite = match &prepared {
                PreparedBackground::Color(color) => compositor::compose_over_color(&fg, *color),
                PreparedBackground::Image(bg) => compositor::compose_over_image(&fg, bg),
            };
            ImageIOService::encode_png(&composite.into_dynamic())
        })
        .await?;

        tracing::info!(
            remover = self.remover.name(),
            output_bytes = png.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "background replaced"
        );
        Ok(png)
    }

    /// Check that the photo decodes and decode an image background
    async fn prepare(photo: Vec<u8>, background: BackgroundSpec) -> Result<PreparedBackground> {
        blocking(move || {
            ImageIOService::load_from_bytes(&photo, ImageRole::Foreground)?;
            Ok(match background {
                BackgroundSpec::Color(color) => PreparedBackground::Color(color),
                BackgroundSpec::Image(bytes) => PreparedBackground::Image(
                    ImageIOService::load_from_bytes(&bytes, ImageRole::Background)?,
                ),
            })
        })
        .await
    }
}

async fn blocking<T: Send + 'static>(task: impl FnOnce() -> Result<T> + Send + 'static) -> Result<T> {
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ImgToolsError::internal(format!("image task failed: {}", e)))?
}
