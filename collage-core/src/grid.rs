//! Grid configuration and square-tile geometry.
//!
//! The canvas is a normalized square running from 0 to 100 on both axes.
//! Tiles are always square, so a tile's geometry is a top-left corner plus
//! a single side length, all in canvas percent.

use serde::{Deserialize, Serialize};

/// Side length of the normalized canvas.
pub const CANVAS_EXTENT: f64 = 100.0;

/// Tolerance for float error when mapping a coordinate onto a cell index.
const CELL_EPSILON: f64 = 1e-6;

/// Grid settings shared by both axes of the square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Number of divisions per axis.
    pub columns: u32,
    /// Whether drags and nudges snap to cell boundaries.
    pub snap_enabled: bool,
    /// Whether the host should draw grid lines.
    pub show_grid_lines: bool,
}

impl GridConfig {
    /// Fewest divisions accepted.
    pub const MIN_COLUMNS: u32 = 1;
    /// Most divisions accepted.
    pub const MAX_COLUMNS: u32 = 100;

    /// Grid with the given column count and default flags.
    #[must_use]
    pub fn new(columns: u32) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Effective column count, clamped into the accepted range.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns.clamp(Self::MIN_COLUMNS, Self::MAX_COLUMNS)
    }

    /// Side length of one cell in canvas percent.
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        CANVAS_EXTENT / f64::from(self.columns())
    }

    /// Snap a coordinate to the nearest cell boundary if snapping is on.
    #[must_use]
    pub fn snap(&self, value: f64) -> f64 {
        if self.snap_enabled {
            snap_to_grid(value, self.cell_size())
        } else {
            value
        }
    }

    /// Percent offsets of the interior grid lines, empty when hidden.
    #[must_use]
    pub fn grid_lines(&self) -> Vec<f64> {
        if !self.show_grid_lines {
            return Vec::new();
        }
        let cell = self.cell_size();
        (1..self.columns()).map(|i| f64::from(i) * cell).collect()
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 12,
            snap_enabled: true,
            show_grid_lines: true,
        }
    }
}

/// Round a coordinate to the nearest multiple of `cell_size`.
#[must_use]
pub fn snap_to_grid(value: f64, cell_size: f64) -> f64 {
    if cell_size <= 0.0 {
        return value;
    }
    (value / cell_size).round() * cell_size
}

/// Index of the cell containing `value` along one axis.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cell_index(value: f64, cell_size: f64) -> i64 {
    (value / cell_size + CELL_EPSILON).floor() as i64
}

/// One grid cell addressed by column and row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Column index, 0 at the left edge.
    pub col: u32,
    /// Row index, 0 at the top edge.
    pub row: u32,
}

impl Cell {
    /// Create a cell address.
    #[must_use]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Every cell of a `columns` x `columns` grid in row-major order.
    pub fn all(columns: u32) -> impl Iterator<Item = Cell> {
        (0..columns).flat_map(move |row| (0..columns).map(move |col| Cell::new(col, row)))
    }

    /// The `span` x `span` block whose top-left cell is `self`.
    ///
    /// Returns `None` if the block would run past the grid edge.
    #[must_use]
    pub fn block(self, span: u32, columns: u32) -> Option<Vec<Cell>> {
        if span == 0 || self.col + span > columns || self.row + span > columns {
            return None;
        }
        Some(
            (self.row..self.row + span)
                .flat_map(|row| (self.col..self.col + span).map(move |col| Cell::new(col, row)))
                .collect(),
        )
    }
}

/// Square geometry in canvas percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Square {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Side length.
    pub size: f64,
}

impl Square {
    /// Create a square.
    #[must_use]
    pub const fn new(x: f64, y: f64, size: f64) -> Self {
        Self { x, y, size }
    }

    /// Square covering a `span` x `span` block of cells starting at `cell`.
    #[must_use]
    pub fn from_cells(cell: Cell, span: u32, cell_size: f64) -> Self {
        Self {
            x: f64::from(cell.col) * cell_size,
            y: f64::from(cell.row) * cell_size,
            size: f64::from(span) * cell_size,
        }
        .clamped(cell_size)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.size
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.size
    }

    /// Whether a canvas-percent point lies inside the square.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Force the square inside the canvas with a side of at least `min_size`.
    #[must_use]
    pub fn clamped(self, min_size: f64) -> Self {
        let min_size = min_size.clamp(0.0, CANVAS_EXTENT);
        let size = self.size.clamp(min_size, CANVAS_EXTENT);
        Self {
            x: self.x.clamp(0.0, CANVAS_EXTENT - size),
            y: self.y.clamp(0.0, CANVAS_EXTENT - size),
            size,
        }
    }

    /// Whether the square lies entirely inside the canvas.
    #[must_use]
    pub fn in_bounds(&self) -> bool {
        const TOLERANCE: f64 = 1e-9;
        self.x >= -TOLERANCE
            && self.y >= -TOLERANCE
            && self.right() <= CANVAS_EXTENT + TOLERANCE
            && self.bottom() <= CANVAS_EXTENT + TOLERANCE
    }

    /// Cells overlapped by the square.
    ///
    /// Spans `floor(x / cell)` through `floor((x + size) / cell)` inclusive
    /// on both axes, so a tile also claims the cells touching its right and
    /// bottom edges.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn footprint(&self, cell_size: f64) -> Vec<Cell> {
        let first_col = cell_index(self.x, cell_size).max(0);
        let last_col = cell_index(self.right(), cell_size).max(0);
        let first_row = cell_index(self.y, cell_size).max(0);
        let last_row = cell_index(self.bottom(), cell_size).max(0);

        (first_row..=last_row)
            .flat_map(|row| {
                (first_col..=last_col).map(move |col| Cell::new(col as u32, row as u32))
            })
            .collect()
    }
}
