//! Client for the remove.bg HTTP API

use super::BackgroundRemover;
use crate::{
    config::RemoveBgConfig,
    error::{ImgToolsError, Result},
};
use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;
use std::time::Instant;

/// Error code remove.bg uses when it cannot find a subject
const UNKNOWN_FOREGROUND: &str = "unknown_foreground";

/// Error body returned by remove.bg on non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    code: Option<String>,
}

/// HTTP client for remove.bg
///
/// One request per call, bounded by the configured timeout, no retries.
#[derive(Debug)]
pub struct RemoveBgClient {
    client: Client,
    config: RemoveBgConfig,
}

impl RemoveBgClient {
    /// Build a client from configuration
    ///
    /// # Errors
    /// - Missing API key or invalid endpoint/timeout
    /// - Failed to create HTTP client
    pub fn new(config: RemoveBgConfig) -> Result<Self> {
        if !config.has_api_key() {
            return Err(ImgToolsError::invalid_config(
                "A remove.bg API key is required (set REMOVE_BG_API_KEY or --api-key)",
            ));
        }
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                ImgToolsError::invalid_config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl BackgroundRemover for RemoveBgClient {
    async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>> {
        let started = Instant::now();
        let form = multipart::Form::new()
            .part(
                "image_file",
                multipart::Part::bytes(image.to_vec()).file_name("image"),
            )
            .text("size", self.config.size.clone());

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-Api-Key", &self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("request timed out after {}s", self.config.timeout_secs)
                } else {
                    format!("request failed: {}", e)
                };
                tracing::warn!(error = %e, "background removal request failed");
                ImgToolsError::service_unavailable(reason)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            ImgToolsError::service_unavailable(format!("failed to read response body: {}", e))
        })?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if status.is_success() {
            tracing::info!(
                status = status.as_u16(),
                input_bytes = image.len(),
                output_bytes = body.len(),
                elapsed_ms,
                "background removed"
            );
            Ok(body.to_vec())
        } else {
            let err = classify_failure(status, &body);
            tracing::warn!(status = status.as_u16(), elapsed_ms, error = %err, "background removal rejected");
            Err(err)
        }
    }

    fn name(&self) -> &'static str {
        "remove.bg"
    }
}

/// Map a non-success response to the error taxonomy
///
/// Content failures (no subject found) are told apart from everything else so
/// the user can be given a specific message.
fn classify_failure(status: StatusCode, body: &[u8]) -> ImgToolsError {
    let parsed: Option<ApiErrorBody> = serde_json::from_slice(body).ok();
    let first = parsed.as_ref().and_then(|b| b.errors.first());

    let no_subject = first.is_some_and(|entry| {
        entry.code.as_deref() == Some(UNKNOWN_FOREGROUND)
            || entry.title.to_ascii_lowercase().contains("foreground")
    });

    let detail = first.map_or_else(
        || format!("HTTP {}", status.as_u16()),
        |entry| format!("HTTP {}: {}", status.as_u16(), entry.title),
    );

    if no_subject {
        ImgToolsError::no_foreground(detail)
    } else {
        ImgToolsError::service_unavailable(detail)
    }
}
