//! imgtools server CLI
//!
//! Parses flags (with environment fallbacks), sets up tracing, wires the
//! remove.bg client and runs the HTTP server until Ctrl-C.

use super::config::CliConfigBuilder;
use crate::{
    removal::{BackgroundRemover, RemoveBgClient},
    server,
    tracing_config::{TracingConfig, TracingFormat},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

/// Image tools HTTP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "imgtools-server")]
pub struct Cli {
    /// Address to listen on
    #[arg(short, long, env = "IMGTOOLS_BIND", default_value = crate::config::DEFAULT_BIND_ADDR)]
    pub bind: String,

    /// remove.bg API key
    #[arg(long, env = "REMOVE_BG_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Background removal endpoint
    #[arg(long, env = "REMOVE_BG_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Timeout for one background removal request, in seconds (1-600)
    #[arg(long, env = "REMOVE_BG_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Largest accepted request body, in MiB
    #[arg(long, env = "IMGTOOLS_MAX_UPLOAD_MB", default_value_t = 25)]
    pub max_upload_mb: usize,

    /// Directory for per-request upload staging [default: system temp dir]
    #[arg(long, env = "IMGTOOLS_UPLOAD_DIR", value_name = "PATH")]
    pub upload_dir: Option<PathBuf>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => Self::Console,
            CliLogFormat::Compact => Self::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => Self::Json,
        }
    }
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = TracingConfig::new()
        .with_verbosity(cli.verbose)
        .with_format(cli.log_format.into())
        .with_session_id(uuid::Uuid::new_v4().to_string());
    if let Ok(directive) = std::env::var("RUST_LOG") {
        logging = logging.with_env_filter(directive);
    }
    logging.init().context("Failed to initialize tracing")?;

    let config = CliConfigBuilder::from_cli(&cli).context("Invalid configuration")?;
    tracing::debug!(?config, "resolved configuration");

    let remover: Arc<dyn BackgroundRemover> = Arc::new(
        RemoveBgClient::new(config.remove_bg.clone())
            .context("Failed to set up background removal client")?,
    );

    server::serve(config, remover).await.context("Server failed")?;
    Ok(())
}
