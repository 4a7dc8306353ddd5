//! imgtools HTTP server
//!
//! Serves image-to-PDF conversion, cropping and background replacement.

#[cfg(feature = "cli")]
use imgtools::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
