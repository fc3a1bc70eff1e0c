//! Command implementations.

use std::path::Path;

use collage_core::{CanvasState, CollageDocument, GridConfig, SelectedAsset};
use collage_renderer::{
    CollageExporter, DefaultImageLoader, ExportStatus, ExportStyle, StatusBoard,
};
use tracing::{debug, info, warn};

use crate::error::{CliError, CliResult};
use crate::{ExportArgs, FillArgs};

/// Outcome of `collage fill`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillReport {
    /// Tiles placed by this run.
    pub placed: usize,
    /// Tiles in the written layout.
    pub total: usize,
}

/// Outcome of `collage export`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Output edge in pixels.
    pub size: u32,
    /// Tiles in the layout.
    pub tiles: usize,
    /// Whether the clipboard copy succeeded, if one was requested.
    pub copied_to_clipboard: Option<bool>,
    /// Final status board message.
    pub status: ExportStatus,
}

/// Place assets and write the resulting layout.
///
/// Without `--into`, the assets are packed onto an empty canvas. With it,
/// the empty cells of the existing layout are filled.
///
/// # Errors
///
/// Returns an error if an input cannot be read or parsed, or the output
/// cannot be written.
pub fn run_fill(args: &FillArgs) -> CliResult<FillReport> {
    let assets: Vec<SelectedAsset> = serde_json::from_str(&read(&args.assets)?).map_err(
        |source| CliError::Assets {
            path: args.assets.clone(),
            source,
        },
    )?;
    debug!("Read {} assets from {}", assets.len(), args.assets.display());

    let (mut state, placed) = if let Some(into) = &args.into {
        let document = CollageDocument::from_json(&read(into)?)?;
        let mut state = CanvasState::from_document(document);
        if let Some(columns) = args.columns {
            let mut grid = *state.grid();
            grid.columns = columns;
            state.set_grid(grid);
        }
        if let Some(seed) = args.seed {
            state.reseed(seed);
        }
        let placed = state.fill_blanks(&assets).len();
        (state, placed)
    } else {
        let grid = args.columns.map_or_else(GridConfig::default, GridConfig::new);
        let mut state = match args.seed {
            Some(seed) => CanvasState::with_seed(grid, seed),
            None => CanvasState::new(grid),
        };
        let min_count = args.min_count.unwrap_or(assets.len());
        let placed = state.add_assets(&assets, min_count).len();
        (state, placed)
    };

    if placed == 0 {
        warn!("No tiles placed; the layout is unchanged");
    }
    state.deselect();

    write(&args.out, state.document().to_json()?.as_bytes())?;
    info!(
        "Wrote layout with {} tiles to {}",
        state.items().len(),
        args.out.display()
    );

    Ok(FillReport {
        placed,
        total: state.items().len(),
    })
}

/// Render a layout, save it, and optionally copy it to the clipboard.
///
/// A clipboard failure is reported in the result but does not fail the
/// command; the saved file is still valid.
///
/// # Errors
///
/// Returns an error if the layout cannot be read or the export cannot be
/// rendered or saved.
pub async fn run_export(args: &ExportArgs) -> CliResult<ExportReport> {
    let document = CollageDocument::from_json(&read(&args.layout)?)?;
    let state = CanvasState::from_document(document);
    let exporter = CollageExporter::new(ExportStyle::from(args));
    let loader = DefaultImageLoader::new();

    let mut board = StatusBoard::new();
    board.begin();
    let result = match exporter.export(state.items(), &loader).await {
        Ok(artifact) => artifact.save_to_file(&args.out).map(|()| artifact),
        Err(e) => Err(e),
    };
    board.finish(&result, &format!("Saved {}", args.out.display()));
    report(&board);
    let artifact = result?;

    let copied_to_clipboard = if args.clipboard {
        board.begin();
        let copied = artifact.copy_to_clipboard();
        board.finish(&copied, "Copied to clipboard");
        report(&board);
        Some(copied.is_ok())
    } else {
        None
    };

    Ok(ExportReport {
        size: artifact.size,
        tiles: state.items().len(),
        copied_to_clipboard,
        status: board.current(),
    })
}

fn report(board: &StatusBoard) {
    match board.current() {
        ExportStatus::Success(message) => info!("{}", message),
        ExportStatus::Failure(reason) => warn!("Export failed: {}", reason),
        ExportStatus::Idle | ExportStatus::InProgress => {}
    }
}

fn read(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &[u8]) -> CliResult<()> {
    std::fs::write(path, contents).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
