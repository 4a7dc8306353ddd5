//! Tracing subscriber setup for the server binary
//!
//! The library only emits events; the binary decides where they go.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Human-readable output with colours
    #[default]
    Console,
    /// Plain single-line output for CI and log collectors
    Compact,
    /// JSON lines for structured log pipelines
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug, Default)]
pub struct TracingConfig {
    /// Verbosity level from `-v` flags
    pub verbosity: u8,
    pub format: TracingFormat,
    /// Explicit filter directive; wins over `verbosity`
    pub env_filter: Option<String>,
    /// Identifier logged once at startup for correlating a server run
    pub session_id: Option<String>,
}

impl TracingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Filter directive for the configured verbosity
    ///
    /// HTTP request spans from `tower_http` only appear from `-v` upwards.
    #[must_use]
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info,tower_http=warn",
            1 => "debug,tower_http=debug,hyper=info",
            _ => "trace",
        }
    }

    /// Install the global subscriber
    ///
    /// # Errors
    /// - Invalid filter directive
    /// - A global subscriber is already installed
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = match &self.env_filter {
            Some(directive) => EnvFilter::try_new(directive)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };
        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                registry
                    .with(fmt::layer().with_ansi(true).with_target(false).compact())
                    .try_init()?;
            },
            TracingFormat::Compact => {
                registry
                    .with(fmt::layer().with_ansi(false).with_target(true).compact())
                    .try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                registry
                    .with(fmt::layer().json().with_current_span(true).with_span_list(true))
                    .try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::info!(session_id = %session_id, "imgtools session started");
        }
        Ok(())
    }
}
