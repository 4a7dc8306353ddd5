//! Foreground-over-background compositing
//!
//! The foreground is the alpha-masked subject returned by background removal.
//! Output always has the foreground's exact dimensions. A colour background is
//! a flat canvas; an image background is cover-fitted (scaled to fill, centre
//! cropped) before the foreground is blended on top with source-over.

use crate::{
    error::Result,
    services::ImageIOService,
    types::{BackgroundColor, BackgroundSpec, CompositeResult, ImageRole},
};
use image::{imageops::FilterType, DynamicImage, Rgba, RgbaImage};

/// Resampling filter used for cover fitting
const COVER_FILTER: FilterType = FilterType::Lanczos3;

/// Composite a decoded foreground over `background`
///
/// A foreground without an alpha channel is treated as fully opaque, so the
/// background never shows through. Inputs are not modified.
///
/// # Errors
/// - `InvalidBackgroundImage` if an image background fails to decode
pub fn compose(foreground: &DynamicImage, background: &BackgroundSpec) -> Result<CompositeResult> {
    match background {
        BackgroundSpec::Color(color) => Ok(compose_over_color(foreground, *color)),
        BackgroundSpec::Image(bytes) => {
            let bg = ImageIOService::load_from_bytes(bytes, ImageRole::Background)?;
            Ok(compose_over_image(foreground, &bg))
        },
    }
}

/// Composite over a flat colour canvas
///
/// A colour with alpha 0 draws nothing, so the foreground comes back as is.
#[must_use]
pub fn compose_over_color(foreground: &DynamicImage, color: BackgroundColor) -> CompositeResult {
    let fg = foreground.to_rgba8();
    let (width, height) = fg.dimensions();

    let image = if color.is_transparent() {
        fg
    } else {
        blend_over(&fg, RgbaImage::from_pixel(width, height, color.to_rgba()))
    };

    tracing::debug!(width, height, background = "color", "composited foreground");
    CompositeResult { image }
}

/// Composite over an already decoded background, cover-fitted to the foreground
#[must_use]
pub fn compose_over_image(foreground: &DynamicImage, background: &DynamicImage) -> CompositeResult {
    let fg = foreground.to_rgba8();
    let (width, height) = fg.dimensions();
    let image = blend_over(&fg, cover_fit(background, width, height));

    tracing::debug!(
        width,
        height,
        background_width = background.width(),
        background_height = background.height(),
        background = "image",
        "composited foreground"
    );
    CompositeResult { image }
}

/// Decode `foreground` bytes and composite them over `background`
///
/// The foreground is decoded first, so a corrupt foreground is reported
/// before the background is looked at.
///
/// # Errors
/// - `InvalidForegroundImage` if the foreground fails to decode
/// - `InvalidBackgroundImage` if an image background fails to decode
pub fn compose_bytes(foreground: &[u8], background: &BackgroundSpec) -> Result<CompositeResult> {
    let fg = ImageIOService::load_from_bytes(foreground, ImageRole::Foreground)?;
    compose(&fg, background)
}

/// Scale `image` to fully cover `width`x`height`, cropping the overflow evenly
///
/// Aspect ratio is preserved and the result is never letterboxed.
#[must_use]
pub fn cover_fit(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }
    if image.width() == width && image.height() == height {
        return image.to_rgba8();
    }
    image.resize_to_fill(width, height, COVER_FILTER).to_rgba8()
}

/// Blend `fg` over `bg` in place of `bg` and return it
///
/// Both buffers must have identical dimensions.
fn blend_over(fg: &RgbaImage, mut bg: RgbaImage) -> RgbaImage {
    debug_assert_eq!(fg.dimensions(), bg.dimensions());
    for (dst, src) in bg.pixels_mut().zip(fg.pixels()) {
        *dst = source_over(*src, *dst);
    }
    bg
}

/// Porter-Duff source-over for a single straight-alpha pixel
///
/// Opaque and fully transparent sources short-circuit so those pixels are
/// copied exactly rather than passing through float rounding.
#[must_use]
pub fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let [sr, sg, sb, sa] = src.0;
    match sa {
        255 => return src,
        0 => return dst,
        _ => {},
    }

    let [dr, dg, db, da] = dst.0;
    let src_a = f32::from(sa) / 255.0;
    let dst_a = f32::from(da) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let channel = |s: u8, d: u8| -> u8 {
        let c = (f32::from(s) * src_a + f32::from(d) * dst_a * (1.0 - src_a)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(sr, dr),
        channel(sg, dg),
        channel(sb, db),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 10, 10, 255])
            } else {
                Rgba([10, 200, 10, 0])
            }
        })
    }

    #[test]
    fn test_source_over_extremes() {
        let src = Rgba([1, 2, 3, 255]);
        let dst = Rgba([9, 9, 9, 255]);
        assert_eq!(source_over(src, dst), src);

        let clear = Rgba([1, 2, 3, 0]);
        assert_eq!(source_over(clear, dst), dst);
    }

    #[test]
    fn test_source_over_half_alpha_on_opaque() {
        let src = Rgba([255, 0, 0, 128]);
        let dst = Rgba([0, 0, 255, 255]);
        let out = source_over(src, dst);
        assert_eq!(out[3], 255);
        assert!((i32::from(out[0]) - 128).abs() <= 1);
        assert!((i32::from(out[2]) - 127).abs() <= 1);
        assert_eq!(out[1], 0);
    }

    #[test]
    fn test_source_over_onto_transparent_keeps_source_colour() {
        let src = Rgba([40, 80, 120, 100]);
        let out = source_over(src, Rgba([0, 0, 0, 0]));
        assert_eq!(out, src);
    }

    #[test]
    fn test_color_background_fills_transparent_pixels() {
        let fg = DynamicImage::ImageRgba8(checker(4, 4));
        let result = compose(&fg, &BackgroundSpec::Color(BackgroundColor::white())).unwrap();

        assert_eq!(result.dimensions(), (4, 4));
        assert_eq!(*result.image.get_pixel(0, 0), Rgba([200, 10, 10, 255]));
        assert_eq!(*result.image.get_pixel(1, 0), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_transparent_color_is_noop() {
        let fg_pixels = checker(3, 5);
        let fg = DynamicImage::ImageRgba8(fg_pixels.clone());
        let result = compose(&fg, &BackgroundSpec::Color(BackgroundColor::transparent())).unwrap();
        assert_eq!(result.image, fg_pixels);
    }

    #[test]
    fn test_rgb_foreground_is_opaque() {
        let fg = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(2, 2, Rgb([7, 8, 9])));
        let result = compose(&fg, &BackgroundSpec::Color(BackgroundColor::white())).unwrap();
        assert!(result.image.pixels().all(|p| *p == Rgba([7, 8, 9, 255])));
    }

    /// 300x100 source split into red, green and blue thirds
    fn bands() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(300, 100, |x, _| match x / 100 {
            0 => Rgba([255, 0, 0, 255]),
            1 => Rgba([0, 255, 0, 255]),
            _ => Rgba([0, 0, 255, 255]),
        }))
    }

    #[test]
    fn test_cover_fit_crops_around_centre() {
        let fitted = cover_fit(&bands(), 100, 100);
        assert_eq!(fitted.dimensions(), (100, 100));

        let green = Rgba([0, 255, 0, 255]);
        for (x, y) in [(0, 0), (99, 0), (0, 99), (99, 99), (50, 50)] {
            assert_eq!(*fitted.get_pixel(x, y), green, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn test_cover_fit_tall_target() {
        let tall = cover_fit(&DynamicImage::new_rgba8(10, 10), 3, 9);
        assert_eq!(tall.dimensions(), (3, 9));
    }

    #[test]
    fn test_image_background_uses_centre_of_source() {
        let fg = DynamicImage::ImageRgba8(checker(100, 100));
        let result = compose_over_image(&fg, &bands());

        assert_eq!(*result.image.get_pixel(0, 0), Rgba([200, 10, 10, 255]));
        assert_eq!(*result.image.get_pixel(1, 0), Rgba([0, 255, 0, 255]));
        assert_eq!(*result.image.get_pixel(99, 98), Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_cover_fit_same_size_is_identity() {
        let src = checker(6, 4);
        let fitted = cover_fit(&DynamicImage::ImageRgba8(src.clone()), 6, 4);
        assert_eq!(fitted, src);
    }

    #[test]
    fn test_invalid_background_bytes() {
        let fg = DynamicImage::new_rgba8(2, 2);
        let err = compose(&fg, &BackgroundSpec::Image(b"junk".to_vec())).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ImgToolsError::InvalidBackgroundImage(_)
        ));
    }

    #[test]
    fn test_invalid_foreground_bytes() {
        let err = compose_bytes(b"junk", &BackgroundSpec::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ImgToolsError::InvalidForegroundImage(_)
        ));
    }
}
