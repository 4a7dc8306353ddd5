//! Image decode/encode service
//!
//! Keeps byte-level codec handling out of the compositor and PDF assembler,
//! and turns codec failures into role-specific errors.

use crate::{
    error::{ImgToolsError, Result},
    types::ImageRole,
};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Service for decoding uploads and encoding responses in memory
pub struct ImageIOService;

impl ImageIOService {
    /// Decode image bytes, attributing failures to `role`
    ///
    /// Format is detected from content, never from a client-supplied name.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use imgtools::{services::ImageIOService, types::ImageRole};
    ///
    /// let data = std::fs::read("input.jpg")?;
    /// let image = ImageIOService::load_from_bytes(&data, ImageRole::Foreground)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load_from_bytes(bytes: &[u8], role: ImageRole) -> Result<DynamicImage> {
        if bytes.is_empty() {
            return Err(Self::decode_error(role, "image data is empty".to_string()));
        }

        image::load_from_memory(bytes).map_err(|e| {
            tracing::debug!(?role, size = bytes.len(), error = %e, "image decode failed");
            Self::decode_error(role, format!("{} ({} bytes)", e, bytes.len()))
        })
    }

    fn decode_error(role: ImageRole, reason: String) -> ImgToolsError {
        match role {
            ImageRole::Foreground => ImgToolsError::invalid_foreground(reason),
            ImageRole::Background => ImgToolsError::invalid_background(reason),
            ImageRole::Page(index) => ImgToolsError::unreadable_image(index, reason),
        }
    }

    /// Encode an image as PNG into a byte buffer
    pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| ImgToolsError::encode(format!("Failed to encode PNG: {}", e)))?;
        Ok(buffer)
    }

    /// Whether a declared multipart content type may hold an image
    ///
    /// A missing type is accepted and left to the decoder. Anything declared
    /// must be `image/*`.
    pub fn is_acceptable_content_type(content_type: Option<&str>) -> bool {
        match content_type {
            None => true,
            Some(ct) => {
                let ct = ct.trim().to_ascii_lowercase();
                ct.starts_with("image/")
            },
        }
    }

    /// Check if a file name has a supported image extension
    pub fn is_supported_format(file_name: &str) -> bool {
        std::path::Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                matches!(
                    ext.to_lowercase().as_str(),
                    "jpg" | "jpeg" | "png" | "webp" | "tiff" | "tif" | "bmp" | "gif"
                )
            })
    }
}
