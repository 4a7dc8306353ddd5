//! Route handlers
//!
//! Each handler reads the whole form into a request-scoped staging directory,
//! validates, processes, and finishes the form before building the response.
//! Early returns drop the form, which removes the staged files as well.

use super::{error::ApiError, form::UploadForm, AppState};
use crate::{
    cropper,
    error::ImgToolsError,
    services::ImageIOService,
    types::{BackgroundSpec, CropRegion, ImageRole},
    utils::ColorParser,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Default background colour when `bgColor` is missing
const DEFAULT_BG_COLOR: &str = "#000000";

fn accept_multipart(multipart: Result<Multipart, MultipartRejection>) -> Result<Multipart, ApiError> {
    multipart.map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))
}

async fn join<T: Send + 'static>(
    task: impl FnOnce() -> crate::Result<T> + Send + 'static,
) -> Result<T, ApiError> {
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| ImgToolsError::internal(format!("worker task failed: {}", e)))?
        .map_err(ApiError::from)
}

/// `POST /api/convert`: images in, one PDF out
pub async fn convert(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let form = UploadForm::read(accept_multipart(multipart)?, state.upload_dir()).await?;

    let staged = form.files("images");
    if staged.is_empty() {
        return Err(ApiError::bad_request("At least one image file is required"));
    }
    for file in &staged {
        if !ImageIOService::is_acceptable_content_type(file.content_type.as_deref()) {
            return Err(ApiError::bad_request(format!(
                "'{}' is not an image",
                file.file_name.as_deref().unwrap_or("upload")
            )));
        }
    }

    let mut images = Vec::with_capacity(staged.len());
    for file in staged {
        images.push(form.staging().read(file).await?);
    }

    let assembler = state.assembler;
    let page_count = images.len();
    let pdf = join(move || assembler.assemble(&images)).await?;
    form.finish();

    tracing::info!(pages = page_count, bytes = pdf.len(), "converted images to PDF");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"converted.pdf\""),
        ],
        pdf,
    )
        .into_response())
}

/// `POST /api/image-bg/remove`: replace a photo's background
pub async fn remove_background(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let form = UploadForm::read(accept_multipart(multipart)?, state.upload_dir()).await?;

    let image = form
        .single_file("image")?
        .ok_or_else(|| ApiError::bad_request("Image file is required"))?;

    let background = match form.text("bgType").unwrap_or("color") {
        "color" => {
            let value = form.text("bgColor").unwrap_or(DEFAULT_BG_COLOR);
            BackgroundSpec::Color(ColorParser::parse(value)?)
        },
        "image" => {
            let file = form
                .single_file("bgImage")?
                .ok_or_else(|| ApiError::bad_request("Background image file is required"))?;
            BackgroundSpec::Image(form.staging().read(file).await?.data)
        },
        other => {
            return Err(ApiError::bad_request(format!(
                "Invalid background type '{}'",
                other
            )))
        },
    };

    let photo = form.staging().read(image).await?;
    let png = state.editor.edit(&photo.data, &background).await?;
    form.finish();

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=\"background-edited.png\"",
            ),
        ],
        png,
    )
        .into_response())
}

/// `POST /api/crop`: cut a rectangle out of an image
pub async fn crop(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let form = UploadForm::read(accept_multipart(multipart)?, state.upload_dir()).await?;

    let image = form
        .single_file("image")?
        .ok_or_else(|| ApiError::bad_request("Image file is required"))?;
    let region = CropRegion::new(
        pixel_field(&form, "x")?,
        pixel_field(&form, "y")?,
        pixel_field(&form, "width")?,
        pixel_field(&form, "height")?,
    );

    let photo = form.staging().read(image).await?;
    let png = join(move || {
        let decoded = ImageIOService::load_from_bytes(&photo.data, ImageRole::Foreground)?;
        ImageIOService::encode_png(&cropper::crop(&decoded, region)?)
    })
    .await?;
    form.finish();

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"cropped-image.png\""),
        ],
        png,
    )
        .into_response())
}

/// Read a non-negative pixel value; fractional values are rounded
fn pixel_field(form: &UploadForm, name: &str) -> Result<u32, ApiError> {
    let raw = form
        .text(name)
        .ok_or_else(|| ApiError::bad_request(format!("Missing crop field '{}'", name)))?;
    parse_pixel(raw)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid crop field '{}': '{}'", name, raw)))
}

fn parse_pixel(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<u32>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value.round() > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value.round() as u32)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
