//! Error types for image tool operations

use thiserror::Error;

/// Result type alias for image tool operations
pub type Result<T> = std::result::Result<T, ImgToolsError>;

/// Coarse classification used by the HTTP layer to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed request fields
    InvalidInput,
    /// Image bytes that could not be decoded
    DecodeFailure,
    /// The background-removal service (or another remote call) failed
    UpstreamServiceFailure,
    /// Anything unexpected
    InternalFailure,
}

/// Comprehensive error types for image tool operations
#[derive(Error, Debug)]
pub enum ImgToolsError {
    /// Missing or malformed upload fields
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The foreground (subject) image could not be decoded
    #[error("Invalid foreground image: {0}")]
    InvalidForegroundImage(String),

    /// The replacement background image could not be decoded
    #[error("Invalid background image: {0}")]
    InvalidBackgroundImage(String),

    /// One of the images handed to the PDF assembler could not be decoded
    #[error("Unreadable image at position {index}: {reason}")]
    UnreadableImage { index: usize, reason: String },

    /// The background-removal service found no subject in the photo
    #[error("No foreground detected: {0}")]
    NoForegroundDetected(String),

    /// The background-removal service could not be reached or refused the request
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Encoding an output image failed
    #[error("Encoding error: {0}")]
    Encode(String),

    /// PDF serialization errors
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Input/output errors (temp files, sockets)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ImgToolsError {
    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new foreground decode error
    pub fn invalid_foreground<S: Into<String>>(msg: S) -> Self {
        Self::InvalidForegroundImage(msg.into())
    }

    /// Create a new background decode error
    pub fn invalid_background<S: Into<String>>(msg: S) -> Self {
        Self::InvalidBackgroundImage(msg.into())
    }

    /// Create a new unreadable PDF page image error
    pub fn unreadable_image<S: Into<String>>(index: usize, reason: S) -> Self {
        Self::UnreadableImage {
            index,
            reason: reason.into(),
        }
    }

    /// Create a new "no subject found" error
    pub fn no_foreground<S: Into<String>>(msg: S) -> Self {
        Self::NoForegroundDetected(msg.into())
    }

    /// Create a new upstream service error
    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    /// Create a new encoding error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new PDF error
    pub fn pdf<S: Into<String>>(msg: S) -> Self {
        Self::Pdf(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// Create temp-file error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Classify this error for transport-level handling
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::InvalidForegroundImage(_)
            | Self::InvalidBackgroundImage(_)
            | Self::UnreadableImage { .. } => ErrorKind::DecodeFailure,
            Self::NoForegroundDetected(_) | Self::ServiceUnavailable(_) => {
                ErrorKind::UpstreamServiceFailure
            },
            Self::Encode(_)
            | Self::Pdf(_)
            | Self::Io(_)
            | Self::InvalidConfig(_)
            | Self::Internal(_) => ErrorKind::InternalFailure,
        }
    }

    /// Message safe to show to an end user
    ///
    /// Validation and decode errors echo their detail; upstream and internal
    /// failures collapse to fixed text so nothing internal leaks to clients.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(msg) => msg.clone(),
            Self::InvalidForegroundImage(_) => {
                "The uploaded image could not be read. Please upload a valid image file.".to_string()
            },
            Self::InvalidBackgroundImage(_) => {
                "The background image could not be read. Please upload a valid image file."
                    .to_string()
            },
            Self::UnreadableImage { index, .. } => format!(
                "Image #{} could not be read. Please remove it or upload a valid image file.",
                index + 1
            ),
            Self::NoForegroundDetected(_) => {
                "We couldn't find a subject in this photo. Try an image with a clear foreground."
                    .to_string()
            },
            Self::ServiceUnavailable(_) => {
                "The background removal service is unavailable right now. Please try again later."
                    .to_string()
            },
            _ => "Failed to process image".to_string(),
        }
    }
}
