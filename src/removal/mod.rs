//! Background-removal collaborators
//!
//! Extraction of the subject is delegated to a remote service. The
//! [`BackgroundRemover`] trait is the seam between the request flow and that
//! service, so the HTTP layer can run against [`MockRemover`] in tests.

pub mod mock;
pub mod remove_bg;

use crate::error::Result;
use async_trait::async_trait;

pub use mock::{MockBehavior, MockRemover};
pub use remove_bg::RemoveBgClient;

/// Something that turns a photo into an alpha-masked foreground image
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    /// Return encoded RGBA image bytes with the background made transparent
    ///
    /// Exactly one attempt is made; implementations never retry.
    ///
    /// # Errors
    /// - `NoForegroundDetected` when the service finds no subject
    /// - `ServiceUnavailable` for timeouts, transport errors, and other
    ///   non-success responses
    async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}
