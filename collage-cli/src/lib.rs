//! # Collage CLI
//!
//! Headless host for the collage editor: bulk-places assets into a layout
//! file and renders layout files to PNG.
//!
//! ## Usage
//!
//! ```bash
//! collage fill --assets wallet.json --min-count 24 --out layout.json
//! collage export --layout layout.json --out collage.png --border-width 4
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `FillArgs` / `ExportArgs` - Per-command options with env fallbacks
//! - `run_fill` / `run_export` - Command implementations over
//!   `collage-core` and `collage-renderer`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod commands;
mod error;

pub use commands::{run_export, run_fill, ExportReport, FillReport};
pub use error::{CliError, CliResult};

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use collage_renderer::{Color, ExportStyle, DEFAULT_EXPORT_SIZE};

/// Command-line arguments for `collage`.
#[derive(Debug, Clone, Parser)]
#[command(name = "collage")]
#[command(about = "Build and export NFT collages")]
#[command(version)]
pub struct CliArgs {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Place assets on a grid and write the layout.
    Fill(FillArgs),
    /// Render a layout to PNG.
    Export(ExportArgs),
}

/// Options for `collage fill`.
#[derive(Debug, Clone, Args)]
pub struct FillArgs {
    /// JSON array of selected assets
    #[arg(long)]
    pub assets: PathBuf,

    /// Minimum number of tiles to place (defaults to the asset count)
    #[arg(long)]
    pub min_count: Option<usize>,

    /// Grid columns for a new layout
    #[arg(long, env = "COLLAGE_COLUMNS")]
    pub columns: Option<u32>,

    /// Seed for reproducible placement
    #[arg(long, env = "COLLAGE_SEED")]
    pub seed: Option<u64>,

    /// Existing layout whose empty cells should be filled
    #[arg(long)]
    pub into: Option<PathBuf>,

    /// Where to write the resulting layout
    #[arg(long)]
    pub out: PathBuf,
}

/// Options for `collage export`.
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Layout document to render
    #[arg(long)]
    pub layout: PathBuf,

    /// Where to write the PNG
    #[arg(long)]
    pub out: PathBuf,

    /// Output edge in pixels (clamped to 100-4000)
    #[arg(long, env = "COLLAGE_EXPORT_SIZE", default_value_t = DEFAULT_EXPORT_SIZE)]
    pub size: u32,

    /// Tile border width in pixels
    #[arg(long, default_value_t = 0.0)]
    pub border_width: f32,

    /// Tile corner radius in pixels
    #[arg(long, default_value_t = 0.0)]
    pub border_radius: f32,

    /// Tile border color (#rgb, #rrggbb or #rrggbbaa)
    #[arg(long, default_value = "#ffffff")]
    pub border_color: Color,

    /// Background color; transparent when omitted
    #[arg(long)]
    pub background: Option<Color>,

    /// Use nearest-neighbor scaling
    #[arg(long)]
    pub no_smoothing: bool,

    /// Also copy the image to the system clipboard
    #[arg(long)]
    pub clipboard: bool,
}

impl From<&ExportArgs> for ExportStyle {
    fn from(args: &ExportArgs) -> Self {
        ExportStyle::default()
            .with_size(args.size)
            .with_border(args.border_width, args.border_color)
            .with_radius(args.border_radius)
            .with_background(args.background)
            .with_smoothing(!args.no_smoothing)
    }
}
