//! Multipart form collection
//!
//! File parts are staged to disk as they arrive; text parts are kept in
//! memory. The staging directory lives as long as the [`UploadForm`].

use super::error::ApiError;
use crate::uploads::{StagedFile, UploadStaging};
use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::Path;

/// Field names that always carry files, even without a `filename` parameter
const FILE_FIELDS: &[&str] = &["images", "image", "bgImage"];

/// A fully read multipart request
#[derive(Debug)]
pub struct UploadForm {
    staging: UploadStaging,
    text: HashMap<String, String>,
}

impl UploadForm {
    /// Drain `multipart`, staging file parts under `upload_dir`
    ///
    /// Any failure drops the partially filled staging directory.
    pub async fn read(mut multipart: Multipart, upload_dir: Option<&Path>) -> Result<Self, ApiError> {
        let mut staging = UploadStaging::new(upload_dir)?;
        let mut text = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::from_multipart(&e))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);

            if file_name.is_some() || FILE_FIELDS.contains(&name.as_str()) {
                let bytes = field.bytes().await.map_err(|e| ApiError::from_multipart(&e))?;
                staging.stage(&name, file_name, content_type, &bytes).await?;
            } else {
                let value = field.text().await.map_err(|e| ApiError::from_multipart(&e))?;
                text.insert(name, value);
            }
        }

        Ok(Self { staging, text })
    }

    /// Value of a text field, ignoring blank values
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// All files sent under `field`, in order
    pub fn files<'a>(&'a self, field: &'a str) -> Vec<&'a StagedFile> {
        self.staging.field(field).collect()
    }

    /// The single file sent under `field`
    ///
    /// Returns `Ok(None)` when absent and a 400 when sent more than once.
    pub fn single_file<'a>(&'a self, field: &'a str) -> Result<Option<&'a StagedFile>, ApiError> {
        let mut files = self.staging.field(field);
        let first = files.next();
        if files.next().is_some() {
            return Err(ApiError::bad_request(format!(
                "Only one '{}' file may be uploaded",
                field
            )));
        }
        Ok(first)
    }

    pub fn staging(&self) -> &UploadStaging {
        &self.staging
    }

    /// Remove staged files now, logging rather than failing the request
    pub fn finish(self) {
        let dir = self.staging.path().to_path_buf();
        if let Err(e) = self.staging.close() {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to remove upload staging directory");
        }
    }
}
