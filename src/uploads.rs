//! Per-request staging of uploaded files
//!
//! Every multipart file part is written to a temporary file inside a
//! directory owned by one request. Dropping the [`UploadStaging`] removes the
//! directory and everything in it, so cleanup happens on success, on
//! validation failure, on error propagation, and on panic unwinding alike.

use crate::{
    error::{ImgToolsError, Result},
    services::ImageIOService,
    types::UploadedImage,
};
use std::path::{Path, PathBuf};
use tempfile::{Builder, TempDir};

/// A file written into the staging directory
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Multipart field the file arrived under
    pub field: String,
    /// Client-supplied file name, if any
    pub file_name: Option<String>,
    /// Declared content type, if any
    pub content_type: Option<String>,
    /// Size in bytes
    pub size: usize,
    path: PathBuf,
}

impl StagedFile {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Request-scoped temp directory for uploads
#[derive(Debug)]
pub struct UploadStaging {
    dir: TempDir,
    files: Vec<StagedFile>,
}

impl UploadStaging {
    /// Create a staging directory under `root`, or the system temp dir
    pub fn new(root: Option<&Path>) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("imgtools-upload-");
        let dir = match root {
            Some(root) => builder
                .tempdir_in(root)
                .map_err(|e| ImgToolsError::file_io_error("create staging directory in", root, &e))?,
            None => builder.tempdir()?,
        };
        tracing::trace!(dir = %dir.path().display(), "created upload staging directory");
        Ok(Self {
            dir,
            files: Vec::new(),
        })
    }

    /// Directory holding this request's files
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Files staged so far, in arrival order
    #[must_use]
    pub fn files(&self) -> &[StagedFile] {
        &self.files
    }

    /// Staged files that arrived under `field`, in arrival order
    pub fn field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a StagedFile> + 'a {
        self.files.iter().filter(move |f| f.field == field)
    }

    /// Write `bytes` to a new temp file and record it
    ///
    /// The on-disk name is generated; the client file name only contributes
    /// its extension when it is a known image type.
    pub async fn stage(
        &mut self,
        field: &str,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> Result<StagedFile> {
        let suffix = file_name
            .as_deref()
            .filter(|name| ImageIOService::is_supported_format(name))
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map_or_else(|| ".bin".to_string(), |ext| format!(".{}", ext.to_lowercase()));

        let path = Builder::new()
            .prefix(&format!("{}-{:03}-", field, self.files.len()))
            .suffix(&suffix)
            .tempfile_in(self.dir.path())
            .and_then(|file| file.keep().map_err(|e| e.error))
            .map(|(_, path)| path)
            .map_err(|e| ImgToolsError::file_io_error("create temp file in", self.dir.path(), &e))?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ImgToolsError::file_io_error("write upload", &path, &e))?;

        let staged = StagedFile {
            field: field.to_string(),
            file_name,
            content_type,
            size: bytes.len(),
            path,
        };
        tracing::debug!(
            field,
            size = staged.size,
            file = staged.file_name.as_deref().unwrap_or("-"),
            "staged upload"
        );
        self.files.push(staged.clone());
        Ok(staged)
    }

    /// Read a staged file back as an [`UploadedImage`]
    pub async fn read(&self, staged: &StagedFile) -> Result<UploadedImage> {
        let data = tokio::fs::read(staged.path())
            .await
            .map_err(|e| ImgToolsError::file_io_error("read staged upload", staged.path(), &e))?;
        Ok(UploadedImage {
            file_name: staged.file_name.clone(),
            data,
        })
    }

    /// Remove the directory now, reporting errors instead of ignoring them
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| ImgToolsError::file_io_error("remove staging directory", &path, &e))
    }
}
