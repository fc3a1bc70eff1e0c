//! # Collage CLI
//!
//! Command-line entry point for building and exporting collages.

use clap::Parser;
use collage_cli::{run_export, run_fill, CliArgs, Command};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing, switching to JSON output when `RUST_LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,collage_core=debug,collage_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    tracing::debug!("Parsed arguments: {:?}", args);

    match args.command {
        Command::Fill(fill) => {
            let report = run_fill(&fill)?;
            tracing::info!(
                "Placed {} tiles ({} total) into {}",
                report.placed,
                report.total,
                fill.out.display()
            );
        }
        Command::Export(export) => {
            let report = run_export(&export).await?;
            tracing::info!(
                "Exported {} tiles at {}px to {}",
                report.tiles,
                report.size,
                export.out.display()
            );
            if report.copied_to_clipboard == Some(false) {
                tracing::warn!("Image was saved but could not be copied to the clipboard");
            }
        }
    }

    Ok(())
}
