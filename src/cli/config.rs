//! Conversion from CLI arguments to `ServerConfig`

use crate::cli::main_impl::Cli;
use crate::config::ServerConfig;
use anyhow::{Context, Result};
use std::net::SocketAddr;

/// Convert CLI arguments to a validated `ServerConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    pub(crate) fn from_cli(cli: &Cli) -> Result<ServerConfig> {
        let bind_addr: SocketAddr = cli
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", cli.bind))?;

        let max_upload_bytes = cli
            .max_upload_mb
            .checked_mul(1024 * 1024)
            .with_context(|| format!("Upload limit of {} MiB is too large", cli.max_upload_mb))?;

        let mut builder = ServerConfig::builder()
            .bind_addr(bind_addr)
            .max_upload_bytes(max_upload_bytes)
            .timeout_secs(cli.timeout_secs);
        if let Some(key) = &cli.api_key {
            builder = builder.api_key(key.trim());
        }
        if let Some(endpoint) = &cli.endpoint {
            builder = builder.endpoint(endpoint.as_str());
        }
        if let Some(dir) = &cli.upload_dir {
            builder = builder.upload_dir(dir);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["imgtools-server"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_from_cli_maps_flags() {
        let cli = parse(&[
            "--bind",
            "0.0.0.0:8080",
            "--api-key",
            " key ",
            "--endpoint",
            "http://localhost:9000/removebg",
            "--timeout-secs",
            "12",
            "--max-upload-mb",
            "2",
        ]);
        let config = CliConfigBuilder::from_cli(&cli).unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.remove_bg.api_key, "key");
        assert_eq!(config.remove_bg.endpoint, "http://localhost:9000/removebg");
        assert_eq!(config.remove_bg.timeout_secs, 12);
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(CliConfigBuilder::from_cli(&parse(&["--bind", "not-an-addr"])).is_err());
        assert!(CliConfigBuilder::from_cli(&parse(&["--timeout-secs", "0"])).is_err());
        assert!(CliConfigBuilder::from_cli(&parse(&["--max-upload-mb", "0"])).is_err());
    }
}
