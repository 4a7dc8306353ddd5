//! Configuration types for the image tools server

use crate::error::{ImgToolsError, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default remote endpoint for background removal
pub const DEFAULT_REMOVE_BG_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Default listen address, matching the port the web client expects
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3100";

/// Settings for the remote background-removal service
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveBgConfig {
    /// API key sent as `X-Api-Key`; never logged or serialized
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Service URL
    pub endpoint: String,

    /// Whole-request timeout in seconds (1-600)
    pub timeout_secs: u64,

    /// Output size requested from the service
    pub size: String,
}

impl Default for RemoveBgConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: DEFAULT_REMOVE_BG_ENDPOINT.to_string(),
            timeout_secs: 30,
            size: "auto".to_string(),
        }
    }
}

impl std::fmt::Debug for RemoveBgConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoveBgConfig")
            .field(
                "api_key",
                &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" },
            )
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("size", &self.size)
            .finish()
    }
}

impl RemoveBgConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Validate endpoint and timeout
    ///
    /// The API key is checked separately when a client is built, so servers
    /// wired with an alternative remover can run without one.
    ///
    /// # Errors
    /// - Endpoint that is not an http(s) URL
    /// - Timeout outside 1-600 seconds
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err(ImgToolsError::invalid_config(format!(
                "Background removal endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }

        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ImgToolsError::config_value_error(
                "background removal timeout (seconds)",
                self.timeout_secs,
                "1-600",
                Some(30),
            ));
        }

        Ok(())
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind_addr: SocketAddr,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,

    /// Parent directory for per-request staging (None = system temp)
    pub upload_dir: Option<PathBuf>,

    /// Remote background-removal settings
    pub remove_bg: RemoveBgConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3100)),
            max_upload_bytes: 25 * 1024 * 1024,
            upload_dir: None,
            remove_bg: RemoveBgConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    /// ```rust
    /// use imgtools::ServerConfig;
    ///
    /// let config = ServerConfig::builder()
    ///     .bind_addr("0.0.0.0:8080".parse().unwrap())
    ///     .api_key("secret")
    ///     .timeout_secs(15)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.remove_bg.timeout_secs, 15);
    /// ```
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Zero upload limit
    /// - Upload directory that does not exist
    /// - Invalid background removal settings
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(ImgToolsError::config_value_error(
                "max upload size (bytes)",
                self.max_upload_bytes,
                "> 0",
                Some(25 * 1024 * 1024),
            ));
        }

        if let Some(dir) = &self.upload_dir {
            if !dir.is_dir() {
                return Err(ImgToolsError::invalid_config(format!(
                    "Upload directory '{}' does not exist",
                    dir.display()
                )));
            }
        }

        self.remove_bg.validate()
    }
}

/// Builder for `ServerConfig`
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    #[must_use]
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    #[must_use]
    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    #[must_use]
    pub fn upload_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.upload_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn api_key<S: Into<String>>(mut self, key: S) -> Self {
        self.config.remove_bg.api_key = key.into();
        self
    }

    #[must_use]
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.remove_bg.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.remove_bg.timeout_secs = secs;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - Any validation failure from [`ServerConfig::validate`]
    pub fn build(self) -> Result<ServerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
