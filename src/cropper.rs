//! Rectangle cropping
//!
//! Server-side counterpart of the interactive cropper: the client picks a
//! pixel rectangle and the server cuts it out of the original image.

use crate::{
    error::{ImgToolsError, Result},
    types::CropRegion,
};
use image::DynamicImage;

/// Cut `region` out of `image`
///
/// # Errors
/// - `InvalidInput` if the region is empty or extends past the image
pub fn crop(image: &DynamicImage, region: CropRegion) -> Result<DynamicImage> {
    validate_region(image.width(), image.height(), region)?;
    Ok(image.crop_imm(region.x, region.y, region.width, region.height))
}

/// Check that `region` is non-empty and fully inside a `width`x`height` image
fn validate_region(width: u32, height: u32, region: CropRegion) -> Result<()> {
    if region.width == 0 || region.height == 0 {
        return Err(ImgToolsError::invalid_input(
            "Crop width and height must be greater than zero",
        ));
    }

    let right = u64::from(region.x) + u64::from(region.width);
    let bottom = u64::from(region.y) + u64::from(region.height);
    if right > u64::from(width) || bottom > u64::from(height) {
        return Err(ImgToolsError::invalid_input(format!(
            "Crop region {}x{} at ({}, {}) is outside the {}x{} image",
            region.width, region.height, region.x, region.y, width, height
        )));
    }

    Ok(())
}
