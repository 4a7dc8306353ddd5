//! Core types shared by the compositor, PDF assembler, and HTTP layer

use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// RGBA colour used to fill a synthetic background canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for BackgroundColor {
    fn default() -> Self {
        Self::black()
    }
}

impl BackgroundColor {
    /// Create a fully opaque colour
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a colour with an explicit alpha component
    #[must_use]
    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black, the default background for the removal endpoint
    #[must_use]
    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }

    /// Opaque white
    #[must_use]
    pub fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Fully transparent: no backing layer is drawn behind the foreground
    #[must_use]
    pub fn transparent() -> Self {
        Self::with_alpha(0, 0, 0, 0)
    }

    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    #[must_use]
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

/// What to place behind the foreground subject
///
/// Exactly one variant is populated; "no background" is expressed as a
/// colour with alpha 0 rather than a special string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundSpec {
    /// Flat colour canvas of the foreground's size
    Color(BackgroundColor),
    /// Encoded image bytes, cover-fitted to the foreground's size
    Image(Vec<u8>),
}

impl BackgroundSpec {
    /// Short name used in logs and form fields
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Image(_) => "image",
        }
    }
}

impl Default for BackgroundSpec {
    fn default() -> Self {
        Self::Color(BackgroundColor::default())
    }
}

/// An uploaded image as received from a client
///
/// Pixel dimensions are only known after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedImage {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            file_name: None,
            data,
        }
    }

    #[must_use]
    pub fn with_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Decode and return `(width, height)` without keeping the pixels
    pub fn dimensions(&self) -> image::ImageResult<(u32, u32)> {
        image::ImageReader::new(std::io::Cursor::new(&self.data))
            .with_guessed_format()?
            .into_dimensions()
    }
}

/// Output of a compositing operation
///
/// Always carries the foreground's dimensions.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    pub image: RgbaImage,
}

impl CompositeResult {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    #[must_use]
    pub fn into_dynamic(self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.image)
    }
}

/// Which uploaded image a decode error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Foreground,
    Background,
    /// Zero-based position in a PDF batch
    Page(usize),
}

/// Pixel rectangle selected in the cropper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    #[must_use]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_color_constructors() {
        assert_eq!(BackgroundColor::default(), BackgroundColor::new(0, 0, 0));
        assert!(BackgroundColor::transparent().is_transparent());
        assert!(!BackgroundColor::white().is_transparent());
        assert_eq!(
            BackgroundColor::with_alpha(1, 2, 3, 4).to_rgba(),
            Rgba([1, 2, 3, 4])
        );
    }

    #[test]
    fn test_background_spec_kind() {
        assert_eq!(BackgroundSpec::default().kind(), "color");
        assert_eq!(BackgroundSpec::Image(vec![1, 2, 3]).kind(), "image");
    }

    #[test]
    fn test_uploaded_image_dimensions() {
        let img = DynamicImage::new_rgb8(7, 3);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let upload = UploadedImage::new(bytes).with_file_name("a.png");
        assert_eq!(upload.dimensions().unwrap(), (7, 3));
        assert_eq!(upload.file_name.as_deref(), Some("a.png"));

        assert!(UploadedImage::new(b"nope".to_vec()).dimensions().is_err());
    }
}
