//! In-process remover for tests and offline development

use super::BackgroundRemover;
use crate::{
    error::{ImgToolsError, Result},
    services::ImageIOService,
    types::ImageRole,
};
use async_trait::async_trait;
use image::{DynamicImage, Rgba};
use std::sync::atomic::{AtomicUsize, Ordering};

/// What a [`MockRemover`] does with each request
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Make every pixel matching the top-left pixel's colour transparent
    ///
    /// Good enough to simulate a subject photographed on a plain backdrop.
    CornerKey,
    /// Return the input bytes untouched
    Passthrough,
    /// Return these bytes regardless of input
    Fixed(Vec<u8>),
    /// Fail as if no subject were found
    NoForeground,
    /// Fail as if the service were down
    Unavailable,
}

/// Mock remover that counts calls
#[derive(Debug)]
pub struct MockRemover {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockRemover {
    #[must_use]
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `remove_background` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockRemover {
    fn default() -> Self {
        Self::new(MockBehavior::CornerKey)
    }
}

#[async_trait]
impl BackgroundRemover for MockRemover {
    async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::CornerKey => {
                let decoded = ImageIOService::load_from_bytes(image, ImageRole::Foreground)?;
                let mut rgba = decoded.to_rgba8();
                let Some(&key) = rgba.pixels().next() else {
                    return Err(ImgToolsError::no_foreground("empty image"));
                };
                for px in rgba.pixels_mut() {
                    if *px == key {
                        *px = Rgba([px[0], px[1], px[2], 0]);
                    }
                }
                ImageIOService::encode_png(&DynamicImage::ImageRgba8(rgba))
            },
            MockBehavior::Passthrough => Ok(image.to_vec()),
            MockBehavior::Fixed(bytes) => Ok(bytes.clone()),
            MockBehavior::NoForeground => Err(ImgToolsError::no_foreground(
                "mock: could not identify foreground",
            )),
            MockBehavior::Unavailable => {
                Err(ImgToolsError::service_unavailable("mock: service unavailable"))
            },
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[tokio::test]
    async fn test_corner_key_clears_backdrop() {
        let photo = RgbaImage::from_fn(3, 3, |x, y| {
            if x == 1 && y == 1 {
                Rgba([200, 0, 0, 255])
            } else {
                Rgba([0, 255, 0, 255])
            }
        });
        let bytes = ImageIOService::encode_png(&DynamicImage::ImageRgba8(photo)).unwrap();

        let remover = MockRemover::default();
        let out = remover.remove_background(&bytes).await.unwrap();
        let fg = ImageIOService::load_from_bytes(&out, ImageRole::Foreground)
            .unwrap()
            .to_rgba8();

        assert_eq!(fg.get_pixel(0, 0)[3], 0);
        assert_eq!(*fg.get_pixel(1, 1), Rgba([200, 0, 0, 255]));
        assert_eq!(remover.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_behaviors() {
        let remover = MockRemover::new(MockBehavior::NoForeground);
        assert!(matches!(
            remover.remove_background(b"x").await,
            Err(ImgToolsError::NoForegroundDetected(_))
        ));

        let remover = MockRemover::new(MockBehavior::Unavailable);
        assert!(matches!(
            remover.remove_background(b"x").await,
            Err(ImgToolsError::ServiceUnavailable(_))
        ));
        assert_eq!(remover.calls(), 1);
    }

    #[tokio::test]
    async fn test_fixed_and_passthrough() {
        let remover = MockRemover::new(MockBehavior::Fixed(vec![1, 2]));
        assert_eq!(remover.remove_background(b"abc").await.unwrap(), vec![1, 2]);

        let remover = MockRemover::new(MockBehavior::Passthrough);
        assert_eq!(remover.remove_background(b"abc").await.unwrap(), b"abc");
        assert_eq!(remover.name(), "mock");
    }
}
